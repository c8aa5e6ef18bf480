use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread;

use clap::Parser;

use cellclick_core::clicking::domain::click_delay::ClickDelay;
use cellclick_core::clicking::domain::click_dispatcher::ClickDispatcher;
use cellclick_core::clicking::infrastructure::dry_run_pointer::DryRunPointer;
use cellclick_core::detection::domain::detector_config::CellColor;
use cellclick_core::detection::infrastructure::color_blob_detector::ColorBlobDetector;
use cellclick_core::imaging::infrastructure::image_file_source::ImageFileSource;
use cellclick_core::imaging::infrastructure::image_file_writer::ImageFileWriter;
use cellclick_core::pipeline::pipeline_logger::LogPipelineLogger;
use cellclick_core::pipeline::process_and_click_use_case::ProcessAndClickUseCase;
use cellclick_core::settings::config_handle::ConfigHandle;
use cellclick_core::settings::detector_settings::{DetectorSettings, RegionSettings};
use cellclick_core::settings::json_settings_store::JsonSettingsStore;
use cellclick_core::shared::cancellation::CancellationToken;
use cellclick_core::shared::constants::{DEBUG_IMAGE_NAME, IMAGE_EXTENSIONS, MAX_HUE};
use cellclick_core::shared::region::Region;

/// Detect colored cells in a captured screen image and click each one.
///
/// Detector settings start from a settings file (`--config`, else
/// `config.json` in the working directory, else the user config directory,
/// else built-in defaults). Any detector flag given overrides the file.
#[derive(Parser)]
#[command(name = "cellclick")]
struct Cli {
    /// Image file standing in for the captured screen.
    #[arg(long)]
    screen: PathBuf,

    /// Region to scan as left,top,width,height (default: whole screen).
    #[arg(long)]
    region: Option<Region>,

    /// Cell color: green or red [default: green].
    #[arg(long)]
    color: Option<CellColor>,

    /// Lower hue bound, 0-179 [default: 40]. Ignored for red.
    #[arg(long)]
    hue_min: Option<u8>,

    /// Upper hue bound, 0-179 [default: 80]. Ignored for red.
    #[arg(long)]
    hue_max: Option<u8>,

    /// Lower saturation bound [default: 50].
    #[arg(long)]
    sat_min: Option<u8>,

    /// Upper saturation bound [default: 255].
    #[arg(long)]
    sat_max: Option<u8>,

    /// Lower value (brightness) bound [default: 50].
    #[arg(long)]
    val_min: Option<u8>,

    /// Upper value (brightness) bound [default: 255].
    #[arg(long)]
    val_max: Option<u8>,

    /// Smallest accepted cell area in pixels [default: 100].
    #[arg(long)]
    min_size: Option<f64>,

    /// Largest accepted cell area in pixels [default: 2000].
    #[arg(long)]
    max_size: Option<f64>,

    /// Minimum circularity, 0.0-1.0 [default: 0.7].
    #[arg(long)]
    circularity: Option<f64>,

    /// Overlap sensitivity, 0.0-1.0; above 0.3 touching cells are split [default: 0.5].
    #[arg(long)]
    overlap: Option<f64>,

    /// Erosion passes before dilation [default: 1].
    #[arg(long)]
    erosion: Option<u32>,

    /// Dilation passes after erosion [default: 1].
    #[arg(long)]
    dilation: Option<u32>,

    /// Detect and save the debug image without clicking.
    #[arg(long)]
    preview_only: bool,

    /// Minimum pause after each click, in milliseconds.
    #[arg(long, default_value = "100")]
    delay_min_ms: u64,

    /// Maximum pause after each click, in milliseconds.
    #[arg(long, default_value = "200")]
    delay_max_ms: u64,

    /// Where to write the annotated debug image.
    #[arg(long, default_value = DEBUG_IMAGE_NAME)]
    debug_image: PathBuf,

    /// Settings file to start from. Must exist and be valid.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip looking for a saved settings file; start from built-in defaults.
    #[arg(long, conflicts_with = "config")]
    no_saved_config: bool,

    /// Save the effective settings to this JSON file.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let saved = if cli.no_saved_config {
        DetectorSettings::default()
    } else {
        saved_settings(cli.config.as_deref(), &saved_settings_candidates())?
    };
    let settings = apply_flags(saved, &cli);
    settings.validate()?;

    if let Some(path) = &cli.save_config {
        JsonSettingsStore::new(path).save(&settings)?;
        log::info!("Settings saved to {}", path.display());
    }

    let region = settings.region();
    let color = settings.cell_color;

    let cancel = CancellationToken::new();
    let dispatcher = if cli.preview_only {
        None
    } else {
        spawn_interrupt_watcher(cancel.clone());
        eprintln!("Press Enter to stop clicking.");
        Some(ClickDispatcher::new(
            Box::new(DryRunPointer::new()),
            ClickDelay::from_millis(cli.delay_min_ms, cli.delay_max_ms),
        ))
    };

    let mut use_case = ProcessAndClickUseCase::new(
        Box::new(ImageFileSource::new(&cli.screen)),
        Box::new(ImageFileWriter::new()),
        Box::new(ColorBlobDetector::new()),
        dispatcher,
        Arc::new(ConfigHandle::new(settings.to_config())),
        cli.debug_image.clone(),
        Box::new(LogPipelineLogger::new()),
    );
    let outcome = use_case.execute(region.as_ref(), color, &cancel);

    println!(
        "cells detected: {}, cells clicked: {}",
        outcome.cell_count, outcome.click_count
    );
    if let Some(err) = outcome.error {
        return Err(err.into());
    }
    log::info!("Debug image written to {}", use_case.debug_image_path().display());
    Ok(())
}

/// Where to look for saved settings when `--config` is not given, in order.
fn saved_settings_candidates() -> Vec<JsonSettingsStore> {
    let mut stores = vec![JsonSettingsStore::in_working_dir()];
    match JsonSettingsStore::default_location() {
        Ok(path) => stores.push(JsonSettingsStore::new(path)),
        Err(e) => log::debug!("No user settings location: {e}"),
    }
    stores
}

/// An explicit file must load cleanly. Otherwise the first candidate that
/// exists is loaded, falling back to defaults if it is unreadable.
fn saved_settings(
    explicit: Option<&Path>,
    candidates: &[JsonSettingsStore],
) -> Result<DetectorSettings, Box<dyn std::error::Error>> {
    if let Some(path) = explicit {
        let settings = JsonSettingsStore::new(path).try_load()?;
        log::info!("Loaded settings from {}", path.display());
        return Ok(settings);
    }
    match candidates.iter().find(|store| store.path().exists()) {
        Some(store) => {
            log::info!("Loading saved settings from {}", store.path().display());
            Ok(store.load())
        }
        None => Ok(DetectorSettings::default()),
    }
}

fn apply_flags(mut settings: DetectorSettings, cli: &Cli) -> DetectorSettings {
    if let Some(region) = cli.region {
        settings.region = Some(RegionSettings::from(region));
    }
    if let Some(color) = cli.color {
        settings.cell_color = color;
    }

    let hsv = &mut settings.hsv_range;
    for (slot, flag) in [
        (&mut hsv.hue_min, cli.hue_min),
        (&mut hsv.hue_max, cli.hue_max),
        (&mut hsv.sat_min, cli.sat_min),
        (&mut hsv.sat_max, cli.sat_max),
        (&mut hsv.val_min, cli.val_min),
        (&mut hsv.val_max, cli.val_max),
    ] {
        if let Some(value) = flag {
            *slot = value;
        }
    }

    if let Some(v) = cli.min_size {
        settings.size_filter.min_size = v;
    }
    if let Some(v) = cli.max_size {
        settings.size_filter.max_size = v;
    }
    if let Some(v) = cli.circularity {
        settings.circularity = v;
    }
    if let Some(v) = cli.overlap {
        settings.overlap_sensitivity = v;
    }
    if let Some(v) = cli.erosion {
        settings.morph_operations.erosion = v;
    }
    if let Some(v) = cli.dilation {
        settings.morph_operations.dilation = v;
    }
    settings
}

/// Cancels `cancel` once a line arrives on stdin. End of input is ignored.
fn spawn_interrupt_watcher(cancel: CancellationToken) {
    thread::spawn(move || {
        let mut line = String::new();
        if let Ok(n) = std::io::stdin().lock().read_line(&mut line) {
            if n > 0 {
                log::info!("Interrupt requested");
                cancel.cancel();
            }
        }
    });
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.screen.exists() {
        return Err(format!("Screen image not found: {}", cli.screen.display()).into());
    }
    if !is_image(&cli.screen) {
        return Err(format!(
            "Screen must be an image ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            cli.screen.display()
        )
        .into());
    }
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    for (flag, hue) in [("--hue-min", cli.hue_min), ("--hue-max", cli.hue_max)] {
        if let Some(hue) = hue.filter(|&h| h > MAX_HUE) {
            return Err(format!("{flag} must be between 0 and {MAX_HUE}, got {hue}").into());
        }
    }
    if let Some(c) = cli.circularity.filter(|c| !(0.0..=1.0).contains(c)) {
        return Err(format!("Circularity must be between 0.0 and 1.0, got {c}").into());
    }
    if let Some(o) = cli.overlap.filter(|o| !(0.0..=1.0).contains(o)) {
        return Err(format!("Overlap must be between 0.0 and 1.0, got {o}").into());
    }
    for (flag, size) in [("--min-size", cli.min_size), ("--max-size", cli.max_size)] {
        if let Some(size) = size.filter(|s| !s.is_finite() || *s < 0.0) {
            return Err(format!("{flag} must be non-negative, got {size}").into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
