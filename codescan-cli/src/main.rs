use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{instrument, span, Level};
use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use codescan::toggle::{Page, ToggleBinding, ToggleOutcome};
use codescan::{
    DecodeOptions, DecodeResult, DecoderRegistry, ImageSample, ItemPayload, ScanConfig, Scanner,
    ToggleReactor, ToggleRegistry,
};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

#[derive(Parser)]
#[command(name = "codescan")]
#[command(about = "Scan images for codes, falling back to `not found` without a decoder", long_about = None)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ~/.config/codescan/config.json)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, default_value_t)]
    verbose: bool,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true, default_value_t)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Decode every image found under the given paths
    Scan {
        /// Image files or directories
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Decoder to use
        #[arg(long, value_name = "NAME")]
        decoder: Option<String>,

        /// Decoder option as KEY=VALUE (VALUE is JSON, or a plain string)
        #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
        options: Vec<String>,

        /// Print results as JSON
        #[arg(long, default_value_t)]
        json: bool,
    },

    /// Activate toggle triggers on a page description
    Toggle {
        /// JSON page: {"elements": [...], "bindings": [...]}
        #[arg(long, value_name = "FILE")]
        page: PathBuf,

        /// Trigger element ids, activated in order
        #[arg(value_name = "TRIGGER")]
        triggers: Vec<String>,
    },

    /// Validate a scanned label payload
    Payload {
        #[arg(value_name = "TEXT")]
        text: String,
    },
}

#[derive(Deserialize)]
struct PageFile {
    #[serde(flatten)]
    page: Page,
    #[serde(default)]
    bindings: Vec<ToggleBinding>,
}

#[derive(Serialize)]
struct ScanReport {
    path: PathBuf,
    #[serde(flatten)]
    result: DecodeResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<ItemPayload>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.verbose, args.quiet);

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Scan {
            paths,
            decoder,
            options,
            json,
        } => scan(&config, &paths, decoder.as_deref(), &options, json),
        Command::Toggle { page, triggers } => toggle(&config, &page, &triggers),
        Command::Payload { text } => {
            let payload = ItemPayload::parse(&text)?;
            println!("{}", payload.to_json());
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Error
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ScanConfig> {
    match path {
        Some(path) => ScanConfig::load_from(path).context("Failed to load config"),
        None => Ok(ScanConfig::load().unwrap_or_default()),
    }
}

/// Decoding engines compiled into this binary. None ship today, so every
/// scan goes through the `not found` path until one is registered here.
fn registry() -> DecoderRegistry {
    DecoderRegistry::new()
}

fn build_options(config: &ScanConfig, pairs: &[String]) -> Result<DecodeOptions> {
    let mut options = config.options.clone();
    for pair in pairs {
        let (name, value) = DecodeOptions::parse_pair(pair)
            .with_context(|| format!("Invalid option `{pair}`, expected KEY=VALUE"))?;
        options.set(name, value);
    }
    Ok(options)
}

fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = paths
        .iter()
        .flat_map(|path| {
            if path.is_file() {
                return vec![path.clone()];
            }
            WalkDir::new(path)
                .into_iter()
                .filter_map(|entry| {
                    entry
                        .map_err(|e| log::warn!("Failed to read directory entry: {}", e))
                        .ok()
                })
                .filter(|entry| entry.file_type().is_file() && is_image(entry.path()))
                .map(|entry| entry.into_path())
                .collect()
        })
        .collect();

    files.sort();
    files.dedup();
    files
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[instrument(level = "debug", skip_all, fields(num_paths = paths.len()))]
fn scan(
    config: &ScanConfig,
    paths: &[PathBuf],
    decoder: Option<&str>,
    pairs: &[String],
    json: bool,
) -> Result<()> {
    for path in paths {
        if !path.exists() {
            anyhow::bail!("Input does not exist: {}", path.display());
        }
    }

    let options = build_options(config, pairs)?;
    let preferred = decoder.or(config.decoder.as_deref());
    let scanner = Scanner::new(registry().resolve_capability(preferred));

    let files = collect_images(paths);
    log::info!("Found {} images", files.len());

    let reports = scan_files(&scanner, &files, &options);

    if json {
        println!("{}", render_json(&reports)?);
        return Ok(());
    }

    for line in render_lines(&reports) {
        println!("{line}");
    }

    let found = reports.iter().filter(|r| r.result.is_found()).count();
    log::info!("Decoded {found} of {} images", reports.len());

    Ok(())
}

/// Decode every file in parallel; files that fail to load are skipped.
fn scan_files(scanner: &Scanner, files: &[PathBuf], options: &DecodeOptions) -> Vec<ScanReport> {
    files
        .par_iter()
        .filter_map(|path| {
            let _guard = span!(Level::DEBUG, "scan_file", file = %path.display()).entered();
            let sample = ImageSample::from_path(path)
                .map_err(|e| log::warn!("Skipping {}: {}", path.display(), e))
                .ok()?;
            let result = scanner.decode(&sample, Some(options));
            let payload = result.code().and_then(|code| code.payload().ok());
            Some(ScanReport {
                path: path.clone(),
                result,
                payload,
            })
        })
        .collect()
}

fn render_json(reports: &[ScanReport]) -> Result<String> {
    serde_json::to_string_pretty(reports).context("Failed to render results")
}

fn render_lines(reports: &[ScanReport]) -> Vec<String> {
    reports
        .iter()
        .map(|report| match report.result.code() {
            Some(code) => format!("{}: {}", report.path.display(), code.text),
            None => format!("{}: not found", report.path.display()),
        })
        .collect()
}

fn toggle(config: &ScanConfig, page_path: &Path, triggers: &[String]) -> Result<()> {
    let contents = std::fs::read_to_string(page_path)
        .with_context(|| format!("Failed to read {}", page_path.display()))?;
    let PageFile { mut page, bindings } =
        serde_json::from_str(&contents).context("Failed to parse page description")?;

    let registry = toggle_registry(config, &page, &bindings);
    log::debug!("{} toggle bindings", registry.len());

    for line in run_toggles(ToggleReactor::new(registry), &mut page, triggers) {
        println!("{line}");
    }

    Ok(())
}

/// Page markers first, then config bindings, then the page file's own
/// bindings; each layer only replaces the triggers it names.
fn toggle_registry(config: &ScanConfig, page: &Page, bindings: &[ToggleBinding]) -> ToggleRegistry {
    let mut registry = ToggleRegistry::scan(page);
    registry.extend(&config.toggles);
    registry.extend(bindings);
    registry
}

/// Activate `triggers` in order and describe every bound target afterwards.
fn run_toggles(reactor: ToggleReactor, page: &mut Page, triggers: &[String]) -> Vec<String> {
    for trigger in triggers {
        match reactor.activate(page, trigger) {
            ToggleOutcome::Toggled { target, visibility } => {
                log::debug!("{trigger} -> {target}: {visibility:?}")
            }
            ToggleOutcome::Ignored => log::debug!("{trigger}: ignored"),
        }
    }

    reactor
        .registry()
        .bindings()
        .map(|binding| match page.query_selector(&binding.target) {
            Some(el) => format!("{}: {:?}", el.id, el.visibility()),
            None => format!("{}: unresolved", binding.target),
        })
        .collect()
}
