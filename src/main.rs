use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{ArgAction, Parser};
use eframe::egui;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use imagebatch::app::ImageBatchApp;
use imagebatch::fs_utils::collect_sources;
use imagebatch::image_utils::{DEFAULT_MAX_DIMENSION, WORKING_LIMIT};
use imagebatch::pipeline::PipelineConfig;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Drop images, crop each one, and collect the resized results"
)]
struct Args {
    /// Images or directories to load as the first batch
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Recurse into subdirectories of directory arguments
    #[arg(short = 'r', long = "recursive", default_value_t = false)]
    recursive: bool,

    /// Longest side of an accepted image, in pixels
    #[arg(short = 'm', long = "max-dimension", default_value_t = DEFAULT_MAX_DIMENSION)]
    max_dimension: u32,

    /// Number of threads decoding one batch
    #[arg(short = 'j', long = "parallel", default_value_t = 4)]
    parallel: usize,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("imagebatch={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("eframe=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;

    if args.max_dimension == 0 {
        return Err(anyhow!("--max-dimension must be at least 1"));
    }
    let config = PipelineConfig {
        max_dimension: args.max_dimension,
        decode_threads: args.parallel.max(1),
        working_limit: WORKING_LIMIT,
    };
    let initial = collect_sources(&args.paths, args.recursive)?;
    info!(initial = initial.len(), max_dimension = config.max_dimension, "starting");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1024.0, 768.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "ImageBatch",
        native_options,
        Box::new(
            move |_cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                let app = ImageBatchApp::new(config, initial)?;
                Ok(Box::new(app))
            },
        ),
    )?;

    Ok(())
}
