//! Drawing surface for watermarks.
//!
//! [`Canvas`] is the seam between layout and pixels: the renderer only ever
//! measures and draws strings through it. [`ImageCanvas`] is the real
//! implementation, rasterizing glyphs with `ab_glyph` straight onto an
//! [`RgbImage`] and alpha-blending the anti-aliased coverage.

use ab_glyph::{Font, GlyphId, PxScale, PxScaleFont, ScaleFont, point};
use image::{Rgb, RgbImage, Rgba};

use super::font::FontSet;

/// Which face of the [`FontSet`] to draw with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Regular,
    Bold,
}

/// Size of a measured string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub width: u32,
    pub height: u32,
}

/// A surface the watermark can be measured against and drawn onto.
pub trait Canvas {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Bounding box of `text` at `size` px. Text wider than `max_width` wraps
    /// at spaces, so the box grows in height instead of width.
    fn measure_text(&self, text: &str, weight: FontWeight, size: f32, max_width: u32)
    -> TextBounds;

    /// Draw `text` with its bounding box's top-left corner at `origin`.
    /// Pixels falling outside the surface are clipped.
    fn draw_text(
        &mut self,
        text: &str,
        weight: FontWeight,
        size: f32,
        origin: (i32, i32),
        color: Rgba<u8>,
    );
}

/// [`Canvas`] over an RGB image buffer.
pub struct ImageCanvas<'a> {
    image: &'a mut RgbImage,
    fonts: &'a FontSet,
}

impl<'a> ImageCanvas<'a> {
    pub fn new(image: &'a mut RgbImage, fonts: &'a FontSet) -> Self {
        Self { image, fonts }
    }
}

impl Canvas for ImageCanvas<'_> {
    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }

    fn measure_text(
        &self,
        text: &str,
        weight: FontWeight,
        size: f32,
        max_width: u32,
    ) -> TextBounds {
        measure_text(self.fonts.face(weight), text, size, max_width)
    }

    fn draw_text(
        &mut self,
        text: &str,
        weight: FontWeight,
        size: f32,
        origin: (i32, i32),
        color: Rgba<u8>,
    ) {
        let font = self.fonts.face(weight);
        let image = &mut *self.image;
        let (canvas_width, canvas_height) = image.dimensions();

        let scale = PxScale::from(size);
        let scaled_font = font.as_scaled(scale);
        let baseline_y = origin.1 as f32 + scaled_font.ascent();

        let mut cursor_x = origin.0 as f32;
        let mut prev_glyph: Option<GlyphId> = None;

        for c in text.chars() {
            let glyph_id = scaled_font.glyph_id(c);

            if let Some(prev) = prev_glyph {
                cursor_x += scaled_font.kern(prev, glyph_id);
            }

            let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, baseline_y));

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();

                outlined.draw(|px, py, coverage| {
                    let x = px as i32 + bounds.min.x as i32;
                    let y = py as i32 + bounds.min.y as i32;

                    if x >= 0 && y >= 0 && (x as u32) < canvas_width && (y as u32) < canvas_height {
                        blend_pixel(image.get_pixel_mut(x as u32, y as u32), color, coverage);
                    }
                });
            }

            cursor_x += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }
    }
}

/// Measure `text` with `font`, wrapping at spaces when wider than `max_width`.
fn measure_text<F: Font>(font: &F, text: &str, size: f32, max_width: u32) -> TextBounds {
    let scaled_font = font.as_scaled(PxScale::from(size));
    let lines = wrap_lines(&scaled_font, text, max_width as f32);

    let widest = lines
        .iter()
        .map(|line| line_width(&scaled_font, line))
        .fold(0.0f32, f32::max);
    let width = if max_width > 0 { widest.min(max_width as f32) } else { widest };
    let height = scaled_font.height() * lines.len() as f32;

    TextBounds {
        width: width.ceil() as u32,
        height: height.ceil() as u32,
    }
}

/// Advance width of a single line, kerning included.
fn line_width<F: Font>(scaled_font: &PxScaleFont<&F>, text: &str) -> f32 {
    let mut width = 0.0f32;
    let mut prev_glyph: Option<GlyphId> = None;

    for c in text.chars() {
        let glyph_id = scaled_font.glyph_id(c);
        if let Some(prev) = prev_glyph {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        prev_glyph = Some(glyph_id);
    }

    width
}

/// Greedy word wrap. A single word wider than the limit gets a line of its own.
fn wrap_lines<F: Font>(scaled_font: &PxScaleFont<&F>, text: &str, max_width: f32) -> Vec<String> {
    if max_width <= 0.0 || line_width(scaled_font, text) <= max_width {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ') {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if !current.trim_end().is_empty()
            && line_width(scaled_font, candidate.trim_end()) > max_width
        {
            lines.push(current.trim_end().to_string());
            current = word.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.trim_end().is_empty() {
        lines.push(current.trim_end().to_string());
    }

    lines
}

/// Composite `color` over `pixel`, weighted by glyph coverage and the color's alpha.
fn blend_pixel(pixel: &mut Rgb<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0) * color[3] as f32 / 255.0;
    if alpha <= 0.0 {
        return;
    }

    for channel in 0..3 {
        let top = color[channel] as f32;
        let bottom = pixel[channel] as f32;
        pixel[channel] = (top * alpha + bottom * (1.0 - alpha)).round().clamp(0.0, 255.0) as u8;
    }
}
