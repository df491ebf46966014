//! Capture-metadata extraction.
//!
//! - [`extract`]: read Make, Model, FNumber, ISO and ExposureTime from an image
//! - [`MetadataRecord`]: the formatted result, one display string per field
//! - formatting helpers ([`format_aperture`], [`format_shutter_speed`], [`format_iso`])
//!
//! Only opening the file can fail. A missing, mistyped or unformattable tag
//! just leaves its field empty.

mod format;
mod reader;

#[cfg(test)]
pub(crate) mod fixtures;

pub use format::{
    aperture_from_rational, format_aperture, format_iso, format_shutter_speed, rational_to_f64,
    shutter_speed_from_rational,
};
pub use reader::{ExtractionError, MetadataRecord, extract};
