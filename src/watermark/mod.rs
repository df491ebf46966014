//! Watermark composition, layout and drawing.
//!
//! - [`compose_text`]: build `"f/2.8  ISO 400  1/250"` from a record and the display toggles
//! - [`logo_text`]: map a camera maker to the brand label drawn before the text
//! - [`WatermarkRenderer`]: lay the watermark out on a [`Canvas`] and draw it
//!
//! Layout only talks to the canvas through [`Canvas::measure_text`] and
//! [`Canvas::draw_text`], so it can be exercised without any font installed.

mod canvas;
mod font;

pub use canvas::{Canvas, FontWeight, ImageCanvas, TextBounds};
pub use font::FontSet;

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::exif::MetadataRecord;

/// Separator between consecutive watermark fields.
const FIELD_SEPARATOR: &str = "  ";

/// Case-insensitive substring → label drawn in place of the maker string.
const BRAND_TOKENS: &[(&str, &str)] = &[("nikon", "NIKON"), ("canon", "Canon"), ("sony", "SONY")];

/// Vertical anchor of the watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown position '{0}' (expected 'top' or 'bottom')")]
pub struct ParsePositionError(String);

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ParsePositionError(s.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Top => f.write_str("top"),
            Self::Bottom => f.write_str("bottom"),
        }
    }
}

/// Which fields appear in the watermark, and where.
///
/// Built once per batch and shared read-only across every file.
///
/// ```rust
/// use exif_watermark::watermark::{DisplayConfig, Position};
///
/// let display = DisplayConfig::from_options(true, false, true, "top".parse().unwrap());
/// assert!(!display.show_iso);
/// assert_eq!(display.position, Position::Top);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_aperture: bool,
    pub show_iso: bool,
    pub show_shutter_speed: bool,
    pub position: Position,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_aperture: true,
            show_iso: true,
            show_shutter_speed: true,
            position: Position::Bottom,
        }
    }
}

impl DisplayConfig {
    pub fn from_options(
        show_aperture: bool,
        show_iso: bool,
        show_shutter_speed: bool,
        position: Position,
    ) -> Self {
        Self {
            show_aperture,
            show_iso,
            show_shutter_speed,
            position,
        }
    }
}

/// Layout constants. The defaults reproduce the classic look: 20 px margin,
/// font at 1/40 of the image height (never below 12 px), a 2 px drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance from the left edge and from the top/bottom edge, in pixels.
    pub margin: u32,
    pub min_font_size: u32,
    /// Font size is `image height / font_size_divisor`.
    pub font_size_divisor: u32,
    pub shadow_offset: i32,
    /// Space reserved for the brand label, as a multiple of the text box height.
    /// The label is not measured.
    pub logo_width_factor: f32,
    /// RGBA
    pub text_color: [u8; 4],
    pub shadow_color: [u8; 4],
    pub logo_color: [u8; 4],
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 20,
            min_font_size: 12,
            font_size_divisor: 40,
            shadow_offset: 2,
            logo_width_factor: 3.0,
            text_color: [255, 255, 255, 255],
            shadow_color: [0, 0, 0, 180],
            logo_color: [255, 255, 255, 255],
        }
    }
}

/// Join the enabled, non-empty fields in the fixed order aperture, ISO,
/// shutter speed.
///
/// ```rust
/// use exif_watermark::exif::MetadataRecord;
/// use exif_watermark::watermark::{DisplayConfig, compose_text};
///
/// let record = MetadataRecord {
///     aperture: "f/2.8".into(),
///     iso: "ISO 400".into(),
///     shutter_speed: "1/250".into(),
///     ..Default::default()
/// };
/// assert_eq!(compose_text(&record, &DisplayConfig::default()), "f/2.8  ISO 400  1/250");
/// ```
pub fn compose_text(metadata: &MetadataRecord, display: &DisplayConfig) -> String {
    [
        (display.show_aperture, metadata.aperture.as_str()),
        (display.show_iso, metadata.iso.as_str()),
        (display.show_shutter_speed, metadata.shutter_speed.as_str()),
    ]
    .into_iter()
    .filter(|(shown, value)| *shown && !value.is_empty())
    .map(|(_, value)| value)
    .collect::<Vec<_>>()
    .join(FIELD_SEPARATOR)
}

/// Brand label for a camera maker, or `None` when the maker is unknown.
///
/// Makers containing a known brand (any case) get its short label; anything
/// else is drawn as written.
pub fn logo_text(manufacturer: &str) -> Option<String> {
    let manufacturer = manufacturer.trim();
    if manufacturer.is_empty() {
        return None;
    }

    let lower = manufacturer.to_lowercase();
    let label = BRAND_TOKENS
        .iter()
        .find(|(needle, _)| lower.contains(needle))
        .map(|(_, label)| *label)
        .unwrap_or(manufacturer);

    Some(label.to_string())
}

/// Where the brand label goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoPlacement {
    pub text: String,
    pub origin: (i32, i32),
}

/// Resolved placement of everything the renderer draws.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkLayout {
    pub text: String,
    pub font_size: u32,
    pub text_bounds: TextBounds,
    pub logo: Option<LogoPlacement>,
    pub shadow_origin: (i32, i32),
    pub text_origin: (i32, i32),
}

/// Lays out and draws watermarks with a fixed [`LayoutConfig`].
#[derive(Debug, Clone, Default)]
pub struct WatermarkRenderer {
    style: LayoutConfig,
}

impl WatermarkRenderer {
    pub fn new(style: LayoutConfig) -> Self {
        Self { style }
    }

    /// Font size for a canvas of the given height.
    pub fn font_size(&self, canvas_height: u32) -> u32 {
        let scaled = canvas_height.checked_div(self.style.font_size_divisor).unwrap_or(0);
        scaled.max(self.style.min_font_size)
    }

    /// Compute the placement without drawing. `None` when there is no text.
    pub fn layout<C: Canvas + ?Sized>(
        &self,
        canvas: &C,
        metadata: &MetadataRecord,
        display: &DisplayConfig,
    ) -> Option<WatermarkLayout> {
        let text = compose_text(metadata, display);
        if text.is_empty() {
            return None;
        }

        let font_size = self.font_size(canvas.height());
        let text_bounds =
            canvas.measure_text(&text, FontWeight::Regular, font_size as f32, canvas.width());

        let margin = self.style.margin as i64;
        let mut x = margin;
        let y = match display.position {
            Position::Top => margin,
            Position::Bottom => canvas.height() as i64 - text_bounds.height as i64 - margin,
        };

        let logo = logo_text(&metadata.manufacturer).map(|label| {
            let placement = LogoPlacement {
                text: label,
                origin: (clamp_i32(x), clamp_i32(y)),
            };
            x += (self.style.logo_width_factor * text_bounds.height as f32) as i64;
            placement
        });

        let offset = self.style.shadow_offset as i64;
        Some(WatermarkLayout {
            text,
            font_size,
            text_bounds,
            logo,
            shadow_origin: (clamp_i32(x + offset), clamp_i32(y + offset)),
            text_origin: (clamp_i32(x), clamp_i32(y)),
        })
    }

    /// Draw the watermark onto `canvas`: brand label, then shadow, then text.
    ///
    /// Returns the placement that was drawn, or `None` when every field was
    /// hidden or empty (nothing is drawn in that case).
    pub fn render<C: Canvas + ?Sized>(
        &self,
        canvas: &mut C,
        metadata: &MetadataRecord,
        display: &DisplayConfig,
    ) -> Option<WatermarkLayout> {
        let layout = self.layout(canvas, metadata, display)?;
        let size = layout.font_size as f32;

        if let Some(logo) = &layout.logo {
            canvas.draw_text(
                &logo.text,
                FontWeight::Bold,
                size,
                logo.origin,
                Rgba(self.style.logo_color),
            );
        }
        canvas.draw_text(
            &layout.text,
            FontWeight::Regular,
            size,
            layout.shadow_origin,
            Rgba(self.style.shadow_color),
        );
        canvas.draw_text(
            &layout.text,
            FontWeight::Regular,
            size,
            layout.text_origin,
            Rgba(self.style.text_color),
        );

        Some(layout)
    }
}

fn clamp_i32(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
