use anyhow::{Context, Result};
use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::exif::{self, MetadataRecord};
use crate::watermark::{FontSet, ImageCanvas, WatermarkRenderer};

/// Input formats the decoder is built with.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// The result of watermarking a single image.
///
/// One of these is produced per input file, in input order, whether or not
/// the file could be processed.
///
/// # Example
///
/// ```rust,no_run
/// # use exif_watermark::config::Config;
/// # use exif_watermark::pipeline::process_batch;
/// # use exif_watermark::watermark::FontSet;
/// # use std::path::{Path, PathBuf};
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::default();
/// let fonts = FontSet::load(&config.fonts)?;
/// let results = process_batch(&[PathBuf::from("photo.jpg")], Path::new("out"), &config, &fonts)?;
///
/// for result in &results {
///     println!("{}", result.display_name()); // "photo.jpg" or "Failed: photo.jpg"
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Where the watermarked copy was (or, in a dry run, would be) written.
    pub output_path: Option<PathBuf>,
    /// Capture metadata, when the image could be opened.
    pub metadata: Option<MetadataRecord>,
    /// The composed watermark text; `None` when nothing was drawn.
    pub watermark: Option<String>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            output_path: None,
            metadata: None,
            watermark: None,
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    /// Results-list entry: the output file name, prefixed with `Failed: `
    /// when processing did not succeed.
    pub fn display_name(&self) -> String {
        let name = self
            .output_path
            .as_deref()
            .and_then(Path::file_name)
            .or_else(|| self.path.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        if self.succeeded() {
            name
        } else {
            format!("Failed: {name}")
        }
    }
}

/// Collect supported image files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Explicit files keep their
/// order; directories are walked recursively in file-name order. Files with
/// unsupported extensions and paths that do not exist are skipped.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Output location for `input` inside `output_dir`.
///
/// Without a suffix the input file name is reused as-is; with one, the file
/// is renamed to `<stem><suffix>.jpg`.
pub fn output_path(input: &Path, output_dir: &Path, suffix: Option<&str>) -> Option<PathBuf> {
    match suffix {
        Some(suffix) => {
            let stem = input.file_stem()?.to_string_lossy();
            Some(output_dir.join(format!("{stem}{suffix}.jpg")))
        }
        None => Some(output_dir.join(input.file_name()?)),
    }
}

/// Resolve the output path and make sure it cannot clobber the source image.
fn prepare_output(input: &Path, output_dir: &Path, config: &Config) -> Result<PathBuf> {
    let output = output_path(input, output_dir, config.output.file_suffix.as_deref())
        .with_context(|| format!("{} has no file name", input.display()))?;

    if is_same_file(input, &output) {
        anyhow::bail!(
            "Output {} would overwrite the source image; choose another output directory",
            output.display()
        );
    }

    Ok(output)
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Raw EXIF (TIFF) block of a JPEG, if it has one.
fn source_exif(path: &Path) -> Option<Bytes> {
    let bytes = std::fs::read(path).ok()?;
    match Jpeg::from_bytes(Bytes::from(bytes)) {
        Ok(jpeg) => jpeg.exif(),
        Err(e) => {
            log::debug!("No EXIF carried over from {}: {e}", path.display());
            None
        }
    }
}

/// Encode `image` as a JPEG at `quality` and write it to `path`, optionally
/// embedding an EXIF block.
pub fn save_jpeg(image: &RgbImage, path: &Path, quality: u8, exif: Option<Bytes>) -> Result<()> {
    let mut encoded = Vec::new();
    JpegEncoder::new_with_quality(&mut encoded, quality)
        .encode_image(image)
        .context("Failed to encode JPEG")?;

    if let Some(exif) = exif {
        let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded))
            .map_err(|e| anyhow::anyhow!("Failed to parse encoded JPEG: {e}"))?;
        jpeg.set_exif(Some(exif));
        encoded = jpeg.encoder().bytes().to_vec();
    }

    std::fs::write(path, &encoded)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Watermark a single image.
///
/// 1. **Extract**: read capture metadata (an unreadable image fails here)
/// 2. **Render**: decode to 24-bit RGB and draw the watermark
/// 3. **Persist**: write a JPEG into `output_dir` (skipped in a dry run)
///
/// Errors never escape: they are recorded in the returned [`ProcessResult`].
pub fn process_image(
    path: &Path,
    output_dir: &Path,
    config: &Config,
    renderer: &WatermarkRenderer,
    fonts: &FontSet,
) -> ProcessResult {
    let mut result = ProcessResult::new(path);

    let output = match prepare_output(path, output_dir, config) {
        Ok(output) => output,
        Err(e) => {
            result.error = Some(format!("{e:#}"));
            return result;
        }
    };
    result.output_path = Some(output.clone());

    let metadata = match exif::extract(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            result.error = Some(e.to_string());
            return result;
        }
    };

    let mut image = match image::open(path) {
        Ok(decoded) => decoded.to_rgb8(),
        Err(e) => {
            result.error = Some(format!("Failed to decode {}: {e}", path.display()));
            result.metadata = Some(metadata);
            return result;
        }
    };

    let layout = {
        let mut canvas = ImageCanvas::new(&mut image, fonts);
        renderer.render(&mut canvas, &metadata, &config.display)
    };
    match &layout {
        Some(layout) => log::debug!(
            "  \"{}\" at {:?}, {}px{}",
            layout.text,
            layout.text_origin,
            layout.font_size,
            layout
                .logo
                .as_ref()
                .map(|logo| format!(", label \"{}\"", logo.text))
                .unwrap_or_default()
        ),
        None => log::info!("  No capture settings to show, copying without watermark"),
    }
    result.watermark = layout.map(|l| l.text);
    result.metadata = Some(metadata);

    if config.output.dry_run {
        log::info!("  Would write {}", output.display());
        return result;
    }

    let exif_block = if config.output.preserve_exif {
        source_exif(path)
    } else {
        None
    };

    if let Err(e) = save_jpeg(&image, &output, config.output.jpeg_quality, exif_block) {
        result.error = Some(format!("{e:#}"));
    }

    result
}

/// Watermark every image in `paths`, one at a time, in order.
///
/// A failing file is recorded and the batch moves on. Each output path is
/// written at most once: a later input that maps onto a path an earlier one
/// already produced (same file name in another directory) fails instead of
/// overwriting it. The only hard error is an output directory that cannot be
/// created.
pub fn process_batch(
    paths: &[PathBuf],
    output_dir: &Path,
    config: &Config,
    fonts: &FontSet,
) -> Result<Vec<ProcessResult>> {
    if !config.output.dry_run {
        std::fs::create_dir_all(output_dir).with_context(|| {
            format!("Failed to create output directory {}", output_dir.display())
        })?;
    }

    let renderer = WatermarkRenderer::new(config.layout.clone());
    let total = paths.len();
    let mut results = Vec::with_capacity(total);

    // output path -> input that produced it
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();

    for (i, path) in paths.iter().enumerate() {
        log::info!("[{}/{}] Processing: {}", i + 1, total, path.display());

        let target = output_path(path, output_dir, config.output.file_suffix.as_deref());
        let result = match target.as_ref().and_then(|t| claimed.get(t)) {
            Some(earlier) => ProcessResult {
                output_path: target.clone(),
                error: Some(format!(
                    "Output {} is already taken by {}",
                    target.as_deref().unwrap_or(path).display(),
                    earlier.display()
                )),
                ..ProcessResult::new(path)
            },
            None => process_image(path, output_dir, config, &renderer, fonts),
        };

        if let (true, Some(output)) = (result.succeeded(), result.output_path.as_ref()) {
            claimed.insert(output.clone(), path.clone());
        }
        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        }
        results.push(result);
    }

    Ok(results)
}
