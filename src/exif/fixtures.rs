//! Test images with hand-assembled EXIF blocks.
//!
//! The TIFF structure is little-endian: IFD0 holds the ASCII tags plus an
//! ExifIFD pointer, the Exif sub-IFD holds the capture settings. Values wider
//! than four bytes go to a data area right after each IFD.

use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

const TAG_EXIF_IFD_POINTER: u16 = 0x8769;

const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_RATIONAL: u16 = 5;

#[derive(Debug, Clone)]
struct RawEntry {
    tag: u16,
    kind: u16,
    count: u32,
    payload: Vec<u8>,
}

impl RawEntry {
    fn ascii(tag: u16, value: &str) -> Self {
        let mut payload = value.as_bytes().to_vec();
        payload.push(0);
        Self {
            tag,
            kind: TYPE_ASCII,
            count: payload.len() as u32,
            payload,
        }
    }

    fn short(tag: u16, value: u16) -> Self {
        Self {
            tag,
            kind: TYPE_SHORT,
            count: 1,
            payload: value.to_le_bytes().to_vec(),
        }
    }

    fn long(tag: u16, value: u32) -> Self {
        Self {
            tag,
            kind: TYPE_LONG,
            count: 1,
            payload: value.to_le_bytes().to_vec(),
        }
    }

    fn rational(tag: u16, numerator: u32, denominator: u32) -> Self {
        let mut payload = numerator.to_le_bytes().to_vec();
        payload.extend_from_slice(&denominator.to_le_bytes());
        Self {
            tag,
            kind: TYPE_RATIONAL,
            count: 1,
            payload,
        }
    }

    /// Bytes this entry needs in the data area (word aligned).
    fn overflow_len(&self) -> usize {
        if self.payload.len() <= 4 {
            0
        } else {
            self.payload.len() + self.payload.len() % 2
        }
    }
}

/// Builder for a minimal EXIF (TIFF) block.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExifFixture {
    ifd0: Vec<RawEntry>,
    exif: Vec<RawEntry>,
}

impl ExifFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// ASCII tag in IFD0 (Make, Model, …).
    pub(crate) fn ascii(mut self, tag: u16, value: &str) -> Self {
        self.ifd0.push(RawEntry::ascii(tag, value));
        self
    }

    /// RATIONAL tag in the Exif sub-IFD.
    pub(crate) fn exif_rational(mut self, tag: u16, numerator: u32, denominator: u32) -> Self {
        self.exif.push(RawEntry::rational(tag, numerator, denominator));
        self
    }

    /// SHORT tag in the Exif sub-IFD.
    pub(crate) fn exif_short(mut self, tag: u16, value: u16) -> Self {
        self.exif.push(RawEntry::short(tag, value));
        self
    }

    /// Serialize to TIFF bytes (what follows `Exif\0\0` in a JPEG APP1 segment).
    pub(crate) fn build(&self) -> Vec<u8> {
        let mut ifd0 = self.ifd0.clone();
        let mut exif = self.exif.clone();
        ifd0.sort_by_key(|e| e.tag);
        exif.sort_by_key(|e| e.tag);

        let ifd0_offset = 8u32;
        if !exif.is_empty() {
            ifd0.push(RawEntry::long(TAG_EXIF_IFD_POINTER, 0));
            ifd0.sort_by_key(|e| e.tag);
            let exif_offset = ifd0_offset + ifd_len(&ifd0) as u32;
            if let Some(pointer) = ifd0.iter_mut().find(|e| e.tag == TAG_EXIF_IFD_POINTER) {
                pointer.payload = exif_offset.to_le_bytes().to_vec();
            }
        }

        let mut out = Vec::new();
        out.extend_from_slice(b"II");
        out.extend_from_slice(&42u16.to_le_bytes());
        out.extend_from_slice(&ifd0_offset.to_le_bytes());

        write_ifd(&mut out, &ifd0);
        if !exif.is_empty() {
            write_ifd(&mut out, &exif);
        }
        out
    }
}

/// Total size of an IFD including its data area.
fn ifd_len(entries: &[RawEntry]) -> usize {
    2 + entries.len() * 12 + 4 + entries.iter().map(RawEntry::overflow_len).sum::<usize>()
}

/// Append an IFD (with its data area) at the current end of `out`.
fn write_ifd(out: &mut Vec<u8>, entries: &[RawEntry]) {
    let start = out.len();
    let mut data_offset = start + 2 + entries.len() * 12 + 4;
    let mut data = Vec::new();

    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&entry.tag.to_le_bytes());
        out.extend_from_slice(&entry.kind.to_le_bytes());
        out.extend_from_slice(&entry.count.to_le_bytes());
        if entry.payload.len() <= 4 {
            let mut inline = entry.payload.clone();
            inline.resize(4, 0);
            out.extend_from_slice(&inline);
        } else {
            out.extend_from_slice(&(data_offset as u32).to_le_bytes());
            data.extend_from_slice(&entry.payload);
            if entry.payload.len() % 2 == 1 {
                data.push(0);
            }
            data_offset = start + 2 + entries.len() * 12 + 4 + data.len();
        }
    }
    // no next IFD
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&data);
}

/// A small gradient so the encoder has something to chew on.
pub(crate) fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

/// Write a JPEG test image, optionally carrying an EXIF block.
pub(crate) fn write_jpeg(
    dir: &Path,
    name: &str,
    width: u32,
    height: u32,
    exif: Option<ExifFixture>,
) -> PathBuf {
    let mut encoded = Vec::new();
    DynamicImage::ImageRgb8(gradient(width, height))
        .write_to(&mut Cursor::new(&mut encoded), ImageFormat::Jpeg)
        .unwrap();

    let bytes = match exif {
        Some(fixture) => {
            let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded)).unwrap();
            jpeg.set_exif(Some(Bytes::from(fixture.build())));
            jpeg.encoder().bytes().to_vec()
        }
        None => encoded,
    };

    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Write a PNG test image (no EXIF).
pub(crate) fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    gradient(width, height).save_with_format(&path, ImageFormat::Png).unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiff_header_and_pointer() {
        let tiff = ExifFixture::new()
            .ascii(0x010F, "NIKON")
            .exif_short(0x8827, 200)
            .build();

        assert_eq!(&tiff[0..4], b"II\x2a\x00");
        assert_eq!(u32::from_le_bytes(tiff[4..8].try_into().unwrap()), 8);
        // IFD0: Make + ExifIFD pointer
        assert_eq!(u16::from_le_bytes(tiff[8..10].try_into().unwrap()), 2);

        // "NIKON\0" is 6 bytes, so IFD0 = 2 + 24 + 4 + 6 = 36 bytes
        let pointer_entry = &tiff[10 + 12..10 + 24];
        assert_eq!(u16::from_le_bytes(pointer_entry[0..2].try_into().unwrap()), 0x8769);
        let exif_offset = u32::from_le_bytes(pointer_entry[8..12].try_into().unwrap()) as usize;
        assert_eq!(exif_offset, 8 + 36);
        assert_eq!(u16::from_le_bytes(tiff[exif_offset..exif_offset + 2].try_into().unwrap()), 1);
    }
}
