//! # exif-watermark
//!
//! Batch EXIF watermarking: read the capture settings (aperture, ISO, shutter
//! speed) and camera maker from each photo and stamp them onto a JPEG copy,
//! optionally preceded by a brand label such as `NIKON`.
//!
//! ## Quick Start
//!
//! The pipeline module handles the full extract → render → save flow:
//!
//! ```rust,no_run
//! use exif_watermark::config::Config;
//! use exif_watermark::pipeline::{collect_images, process_batch};
//! use exif_watermark::watermark::FontSet;
//! use std::path::{Path, PathBuf};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let fonts = FontSet::load(&config.fonts)?;
//!
//!     // Collect supported image files from paths (files or directories)
//!     let images = collect_images(&[PathBuf::from("./photos")]);
//!
//!     for result in process_batch(&images, Path::new("./watermarked"), &config, &fonts)? {
//!         match result.error {
//!             Some(ref err) => eprintln!("{}: {err}", result.display_name()),
//!             None => println!("{}", result.display_name()),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The extractor and the renderer can be used on their own:
//!
//! ```rust,no_run
//! use exif_watermark::exif::extract;
//! use exif_watermark::watermark::{
//!     compose_text, DisplayConfig, FontSet, ImageCanvas, LayoutConfig, WatermarkRenderer,
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!
//!     // 1. Read capture settings
//!     let record = extract(path)?;
//!     let display = DisplayConfig::default();
//!     println!("Watermark: {}", compose_text(&record, &display));
//!
//!     // 2. Draw onto the decoded image
//!     let mut image = image::open(path)?.to_rgb8();
//!     let fonts = FontSet::load(&Default::default())?;
//!     let renderer = WatermarkRenderer::new(LayoutConfig::default());
//!     renderer.render(&mut ImageCanvas::new(&mut image, &fonts), &record, &display);
//!
//!     image.save("photo_watermarked.jpg")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`exif`]: capture-setting extraction and display formatting
//! - [`watermark`]: text composition, layout and glyph rendering
//! - [`pipeline`]: file collection, batch processing, JPEG output
//! - [`config`]: JSON configuration

pub mod config;
pub mod exif;
pub mod pipeline;
pub mod watermark;
