use nom_exif::{EntryValue, Exif, ExifIter, ExifTag, MediaParser, MediaSource};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::format::{aperture_from_rational, format_iso, shutter_speed_from_rational};

/// Capture metadata pulled from one image, already formatted for display.
///
/// Every field is an empty string when the source tag is missing, has an
/// unexpected type, or holds a value that cannot be formatted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    /// Camera maker (`Make`).
    pub manufacturer: String,
    /// Camera model (`Model`).
    pub model: String,
    /// `f/<N.N>`
    pub aperture: String,
    /// `ISO <n>`
    pub iso: String,
    /// `1/<n>` or `<N.N>s`
    pub shutter_speed: String,
}

impl MetadataRecord {
    /// `true` when no field carries a value.
    pub fn is_empty(&self) -> bool {
        self.manufacturer.is_empty()
            && self.model.is_empty()
            && self.aperture.is_empty()
            && self.iso.is_empty()
            && self.shutter_speed.is_empty()
    }
}

/// File-level extraction failure. Field-level problems never surface here.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to open image {}: {source}", path.display())]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Read capture metadata from an image file.
///
/// The image header is probed first; if it cannot be decoded the whole file
/// is rejected with [`ExtractionError::OpenFailed`]. After that, each tag is
/// read independently and a bad tag only empties its own field.
pub fn extract(path: &Path) -> Result<MetadataRecord, ExtractionError> {
    probe_image(path).map_err(|source| ExtractionError::OpenFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let exif = match parse_exif(path) {
        Some(exif) => exif,
        None => {
            log::debug!("No EXIF data found in {}", path.display());
            return Ok(MetadataRecord::default());
        }
    };

    let aperture = match probe_rational(&exif, ExifTag::FNumber, "FNumber") {
        Some((num, den)) => aperture_from_rational(num, den),
        None => String::new(),
    };
    let shutter_speed = match probe_rational(&exif, ExifTag::ExposureTime, "ExposureTime") {
        Some((num, den)) => shutter_speed_from_rational(num, den),
        None => String::new(),
    };
    let iso = probe_short(&exif, ExifTag::ISOSpeedRatings, "ISOSpeedRatings")
        .map(|v| format_iso(u32::from(v)))
        .unwrap_or_default();

    Ok(MetadataRecord {
        manufacturer: probe_text(&exif, ExifTag::Make, "Make"),
        model: probe_text(&exif, ExifTag::Model, "Model"),
        aperture,
        iso,
        shutter_speed,
    })
}

/// Make sure the file is an image the decoder understands.
fn probe_image(path: &Path) -> image::ImageResult<(u32, u32)> {
    image::ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
}

fn parse_exif(path: &Path) -> Option<Exif> {
    let mut parser = MediaParser::new();
    let ms = MediaSource::file_path(path).ok()?;
    if !ms.has_exif() {
        return None;
    }
    let iter: ExifIter = parser.parse(ms).ok()?;
    Some(iter.into())
}

/// ASCII tag as a trimmed string.
fn probe_text(exif: &Exif, tag: ExifTag, label: &str) -> String {
    match exif.get(tag) {
        Some(EntryValue::Text(s)) => s.trim_matches(char::from(0)).trim().to_string(),
        Some(other) => {
            log::debug!("{label}: expected text, found {other:?}");
            String::new()
        }
        None => String::new(),
    }
}

/// Unsigned rational tag as `(numerator, denominator)`.
fn probe_rational(exif: &Exif, tag: ExifTag, label: &str) -> Option<(u32, u32)> {
    let (num, den) = match exif.get(tag)? {
        EntryValue::URational(r) => (r.0, r.1),
        EntryValue::URationalArray(values) => {
            let r = values.first()?;
            (r.0, r.1)
        }
        other => {
            log::debug!("{label}: expected rational, found {other:?}");
            return None;
        }
    };
    if den == 0 {
        log::debug!("{label}: zero denominator");
    }
    Some((num, den))
}

/// Unsigned short tag; multi-valued tags yield their first value.
fn probe_short(exif: &Exif, tag: ExifTag, label: &str) -> Option<u16> {
    match exif.get(tag)? {
        EntryValue::U16(v) => Some(*v),
        EntryValue::U16Array(values) => values.first().copied(),
        other => {
            log::debug!("{label}: expected short, found {other:?}");
            None
        }
    }
}
