use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::watermark::{DisplayConfig, LayoutConfig};

/// Top-level configuration for a watermarking run.
///
/// Controls which capture settings are shown, how the watermark is laid out,
/// which fonts are used, and how output files are written. Every section is
/// optional in the JSON file; missing sections take their defaults.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_watermark::config::Config;
/// use exif_watermark::watermark::Position;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.display.show_iso = false;
/// config.display.position = Position::Top;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which fields appear and where.
    pub display: DisplayConfig,
    /// Margins, font sizing, shadow and colors.
    pub layout: LayoutConfig,
    /// Font files for the watermark text and the brand label.
    pub fonts: FontConfig,
    /// Output behavior (quality, naming, dry run).
    pub output: OutputConfig,
}

/// Font files. Unset paths fall back to well-known system fonts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Face for the watermark text.
    pub regular: Option<PathBuf>,
    /// Face for the brand label. Falls back to `regular` when none is found.
    pub bold: Option<PathBuf>,
}

/// Output and behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JPEG quality, 1–100.
    pub jpeg_quality: u8,
    /// Copy the source JPEG's EXIF block into the watermarked copy.
    pub preserve_exif: bool,
    /// When set, outputs are named `<stem><suffix>.jpg` instead of reusing
    /// the input file name.
    pub file_suffix: Option<String>,
    /// If `true`, do everything except writing output files.
    pub dry_run: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 100,
            preserve_exif: false,
            file_suffix: None,
            dry_run: false,
        }
    }
}

impl Config {
    /// Resolve the config file path: same directory as the executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe_path = std::env::current_exe().context("Failed to get executable path")?;
        let exe_dir = exe_path
            .parent()
            .context("Failed to get executable directory")?;
        Ok(exe_dir.join("config.json"))
    }

    /// Load config from the given path, or from the default location.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !config_path.exists() {
            log::warn!(
                "Config file not found at {}. Using defaults.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(&config_path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given path, or to the default location.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&config_path, contents).context("Failed to write config file")?;
        log::info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Reject values the encoder or layout cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            anyhow::bail!(
                "output.jpeg_quality must be between 1 and 100, got {}",
                self.output.jpeg_quality
            );
        }
        if self.layout.font_size_divisor == 0 {
            anyhow::bail!("layout.font_size_divisor must be greater than 0");
        }
        if !self.layout.logo_width_factor.is_finite() || self.layout.logo_width_factor < 0.0 {
            anyhow::bail!(
                "layout.logo_width_factor must be a non-negative number, got {}",
                self.layout.logo_width_factor
            );
        }
        Ok(())
    }
}
