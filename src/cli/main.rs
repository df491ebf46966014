use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_watermark::watermark::{self, DisplayConfig, FontSet, Position};
use exif_watermark::{config, exif, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-watermark",
    version,
    about = "Stamp aperture, ISO and shutter speed from EXIF onto copies of your photos"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Directory the watermarked copies are written to
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Watermark position: top or bottom
    #[arg(long, value_name = "POSITION")]
    position: Option<Position>,

    /// Leave the aperture out of the watermark
    #[arg(long = "no-aperture")]
    no_aperture: bool,

    /// Leave the ISO out of the watermark
    #[arg(long = "no-iso")]
    no_iso: bool,

    /// Leave the shutter speed out of the watermark
    #[arg(long = "no-shutter")]
    no_shutter: bool,

    /// Render everything but write no files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Display the capture settings of each image and exit
    #[arg(long = "show-exif")]
    show_exif: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Config-file toggles, with command-line flags taking precedence.
    fn display_config(&self, base: &DisplayConfig) -> DisplayConfig {
        DisplayConfig::from_options(
            base.show_aperture && !self.no_aperture,
            base.show_iso && !self.no_iso,
            base.show_shutter_speed && !self.no_shutter,
            self.position.unwrap_or(base.position),
        )
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    let mut config = config::Config::load(cli.config.as_deref())?;
    config.display = cli.display_config(&config.display);
    if cli.dry_run {
        config.output.dry_run = true;
    }

    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-exif
    if cli.show_exif {
        for image_path in &images {
            print_capture_settings(image_path, &config.display);
        }
        return Ok(());
    }

    let Some(output_dir) = cli.output.as_deref() else {
        anyhow::bail!("No output directory specified. Pass --output <DIR>.");
    };

    let fonts = FontSet::load(&config.fonts)?;

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be written");
    }

    let results = pipeline::process_batch(&images, output_dir, &config, &fonts)?;

    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "output_path": r.output_path.as_ref().map(|p| p.display().to_string()),
                    "metadata": r.metadata,
                    "watermark": r.watermark,
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    } else {
        print_results(&results);
    }

    // Summary
    let total = results.len();
    let success = results.iter().filter(|r| r.succeeded()).count();
    let failed = total - success;
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Print the results list, one entry per input file.
fn print_results(results: &[pipeline::ProcessResult]) {
    println!();
    println!("{BOLD}Results:{RESET}");
    println!("{DIM}{}{RESET}", "─".repeat(72));
    for result in results {
        if result.succeeded() {
            println!("  {GREEN}{}{RESET}", result.display_name());
        } else {
            println!("  {RED}{}{RESET}", result.display_name());
        }
    }
    println!();
}

/// Print the capture settings of a file and the watermark it would get.
fn print_capture_settings(path: &Path, display: &DisplayConfig) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let record = match exif::extract(path) {
        Ok(record) => record,
        Err(e) => {
            println!("  {RED}{e}{RESET}");
            println!();
            return;
        }
    };

    if record.is_empty() {
        println!("  {DIM}(no capture settings found){RESET}");
        println!();
        return;
    }

    let fields = [
        ("Make", record.manufacturer.as_str()),
        ("Model", record.model.as_str()),
        ("FNumber", record.aperture.as_str()),
        ("ISO", record.iso.as_str()),
        ("ExposureTime", record.shutter_speed.as_str()),
    ];
    for (tag, val) in fields {
        if !val.is_empty() {
            print_row(tag, val);
        }
    }

    println!("  {DIM}{}{RESET}", "─".repeat(70));
    let text = watermark::compose_text(&record, display);
    if text.is_empty() {
        print_row("Watermark", "(nothing to draw)");
    } else {
        print_row("Watermark", &text);
    }
    if let Some(label) = watermark::logo_text(&record.manufacturer) {
        print_row("Label", &label);
    }
    println!();
}

/// Print a single row in the EXIF display table.
fn print_row(tag: &str, val: &str) {
    println!("  {tag:<22} : {val}");
}
