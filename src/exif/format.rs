//! Conversion of raw EXIF values into the display strings used in watermarks.
//!
//! Every formatter returns an empty string for values it cannot represent
//! (zero denominators, zero exposure), never an error.

/// Slack added before truncating `1/v`, so `1/0.01` lands on 100 rather than 99.
const RECIPROCAL_EPSILON: f64 = 1e-9;

/// Convert an EXIF rational to a float. `None` when the denominator is zero.
pub fn rational_to_f64(numerator: u32, denominator: u32) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Format an f-number as `f/<N.N>`.
pub fn format_aperture(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    format!("f/{value:.1}")
}

/// Format an exposure time in seconds.
///
/// Sub-second exposures become `1/<n>` with `n` truncated toward zero;
/// anything of a second or longer becomes `<N.N>s`. Zero, negative and
/// non-finite values yield an empty string.
///
/// ```rust
/// use exif_watermark::exif::format_shutter_speed;
///
/// assert_eq!(format_shutter_speed(0.004), "1/250");
/// assert_eq!(format_shutter_speed(2.0), "2.0s");
/// assert_eq!(format_shutter_speed(0.0), "");
/// ```
pub fn format_shutter_speed(seconds: f64) -> String {
    if !seconds.is_finite() || seconds <= 0.0 {
        return String::new();
    }

    if seconds < 1.0 {
        let denominator = (1.0 / seconds + RECIPROCAL_EPSILON).trunc();
        format!("1/{}", denominator as u64)
    } else {
        format!("{seconds:.1}s")
    }
}

/// Format an ISO speed as `ISO <n>`.
pub fn format_iso(value: u32) -> String {
    format!("ISO {value}")
}

/// Aperture display string straight from the raw FNumber rational.
pub fn aperture_from_rational(numerator: u32, denominator: u32) -> String {
    rational_to_f64(numerator, denominator)
        .map(format_aperture)
        .unwrap_or_default()
}

/// Shutter speed display string straight from the raw ExposureTime rational.
pub fn shutter_speed_from_rational(numerator: u32, denominator: u32) -> String {
    rational_to_f64(numerator, denominator)
        .map(format_shutter_speed)
        .unwrap_or_default()
}
