use ab_glyph::FontVec;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::canvas::FontWeight;
use crate::config::FontConfig;

/// Common install locations for a sans-serif regular face.
const REGULAR_CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    // macOS
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    // Windows
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Common install locations for the matching bold face.
const BOLD_CANDIDATES: &[&str] = &[
    // Linux
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    // macOS
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    // Windows
    "C:\\Windows\\Fonts\\segoeuib.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Regular face for the watermark text, bold face for the brand label.
pub struct FontSet {
    regular: FontVec,
    bold: FontVec,
}

impl FontSet {
    /// Load the configured faces, falling back to well-known system fonts.
    ///
    /// A missing bold face is not fatal: the regular face is used for the
    /// brand label instead.
    pub fn load(config: &FontConfig) -> Result<Self> {
        let regular_path = resolve_font(config.regular.as_deref(), REGULAR_CANDIDATES).context(
            "No usable font found. Set `fonts.regular` in the config file to a .ttf/.otf path",
        )?;
        let regular = load_font(&regular_path)?;
        log::debug!("Regular font: {}", regular_path.display());

        let bold = match resolve_font(config.bold.as_deref(), BOLD_CANDIDATES) {
            Some(path) => {
                log::debug!("Bold font: {}", path.display());
                load_font(&path)?
            }
            None => {
                log::warn!("No bold font found, using the regular face for brand labels");
                load_font(&regular_path)?
            }
        };

        Ok(Self { regular, bold })
    }

    pub fn face(&self, weight: FontWeight) -> &FontVec {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// An explicitly configured path always wins, even if it turns out unreadable.
fn resolve_font(explicit: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    candidates.iter().map(PathBuf::from).find(|p| p.is_file())
}

fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read font file {}", path.display()))?;
    FontVec::try_from_vec(data)
        .map_err(|e| anyhow::anyhow!("Invalid font file {}: {e}", path.display()))
}
