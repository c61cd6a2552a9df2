//! Three-panel ArUco preview: raw frame, reference drawing, filled overlay.
//!
//!   marker-triptych                 # camera 0, needs the `opencv` feature
//!   marker-triptych 1               # camera 1
//!   marker-triptych --synthetic 30 --output-dir out/
//!   marker-triptych frames/ --output-dir out/ --json-report run.json

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use marker_triptych::{
    run_preview, AppBackend, BackendOptions, DetectorBackend, DictionaryKind, PreviewConfig,
    PreviewError, RunSummary, SourceSpec,
};
#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

#[derive(Parser, Debug)]
#[command(name = "marker-triptych", version, about = "Side-by-side ArUco marker preview")]
struct Cli {
    /// Camera index, video file, or a directory of images.
    #[arg(default_value = "0")]
    source: SourceSpec,

    /// JSON preview configuration; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write composited frames as PNG files instead of opening a window.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Replace the source with N generated frames of known markers.
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    #[arg(long, value_name = "N")]
    max_frames: Option<u64>,

    /// auto, native or opencv.
    #[arg(long)]
    detector: Option<DetectorBackend>,

    /// Marker dictionary, e.g. DICT_4X4_50.
    #[arg(long)]
    dictionary: Option<DictionaryKind>,

    /// TrueType font for captions in native mode.
    #[arg(long)]
    font: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Emit log lines as JSON.
    #[cfg(feature = "tracing")]
    #[arg(long)]
    log_json: bool,

    /// Write the run summary here as JSON.
    #[arg(long)]
    json_report: Option<PathBuf>,
}

impl Cli {
    fn source_spec(&self) -> SourceSpec {
        match self.synthetic {
            Some(frames) => SourceSpec::Synthetic { frames },
            None => self.source.clone(),
        }
    }

    fn preview_config(&self) -> Result<PreviewConfig, PreviewError> {
        let mut config = match &self.config {
            Some(path) => PreviewConfig::load(path)?,
            None => PreviewConfig::default(),
        };
        if let Some(n) = self.max_frames {
            config.max_frames = Some(n);
        }
        if let Some(detector) = self.detector {
            config.detector = detector;
        }
        if let Some(dictionary) = self.dictionary {
            config.dictionary = dictionary;
        }
        if let Some(font) = &self.font {
            config.font_path = Some(font.clone());
        }
        Ok(config)
    }
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        let _ = LogTracer::init();
        let filter = cli.log_level.to_string().to_lowercase();
        marker_triptych::core::init_tracing(cli.log_json, &filter);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = marker_triptych::core::init_with_level(cli.log_level);
    }
}

fn write_report(path: &Path, summary: &RunSummary) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn run(cli: &Cli) -> Result<RunSummary, PreviewError> {
    let config = cli.preview_config()?;
    let mut backend = AppBackend::new(BackendOptions::from_config(
        &config,
        cli.output_dir.clone(),
    ));
    run_preview(&mut backend, &cli.source_spec(), config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let summary = match run(&cli) {
        Ok(summary) => summary,
        Err(err) => {
            if let PreviewError::SourceOpen { detail, .. } = &err {
                log::debug!("source open failed: {detail}");
            }
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "{} frame(s), {} marker(s), stopped: {:?}",
        summary.frames,
        summary.markers,
        summary.stop
    );

    if let Some(path) = &cli.json_report {
        if let Err(err) = write_report(path, &summary) {
            eprintln!("failed to write {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}
