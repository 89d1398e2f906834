use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use stitchprep_core::descriptor::PathMode;
use stitchprep_core::pipeline::config::StitchConfig;
use stitchprep_core::pipeline::{run_pipeline_reported, PipelineStage, ProgressReporter};
use stitchprep_core::tiles::ChannelWavelength;
use tracing::debug;

use crate::summary::{print_config_summary, print_run_summary};

use super::parse_triplet;

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Capsule data folder
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Results folder
    #[arg(long)]
    pub results: Option<PathBuf>,

    /// Tile storage root (local path or s3:// URI)
    #[arg(long)]
    pub data_root: Option<String>,

    /// Channel wavelength to stitch instead of the manifest's
    #[arg(long)]
    pub channel: Option<i64>,

    /// Target registration resolution as X,Y,Z
    #[arg(long, value_parser = parse_triplet)]
    pub target: Option<[f64; 3]>,

    /// Explicit pyramid level (skips estimation)
    #[arg(long)]
    pub downsample: Option<u32>,

    /// Worker count handed to the engine
    #[arg(long)]
    pub parallel: Option<usize>,

    /// Mark the storage root as relative in the descriptor
    #[arg(long)]
    pub relative_paths: bool,

    /// Label calibration in raw units instead of micrometers
    #[arg(long)]
    pub no_microns: bool,
}

struct StageProgress {
    pb: ProgressBar,
}

impl ProgressReporter for StageProgress {
    fn begin_stage(&self, stage: PipelineStage) {
        self.pb.set_message(stage.to_string());
    }

    fn finish_stage(&self) {
        self.pb.inc(1);
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        StitchConfig::from_toml(&contents).context("Invalid pipeline config")?
    } else {
        StitchConfig::default()
    };
    apply_args(&mut config, args);
    debug!(?config, "Resolved pipeline config");

    print_config_summary(&config);

    let pb = ProgressBar::new(PipelineStage::ALL.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:24} [{bar:30}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = StageProgress { pb };

    let output = run_pipeline_reported(&config, &reporter);
    match output {
        Ok(output) => {
            reporter.pb.finish_with_message("Done");
            print_run_summary(&output);
            // Batch callers read the parameter path from stdout.
            println!("{}", output.paths.parameters.display());
            Ok(())
        }
        Err(e) => {
            reporter.pb.abandon_with_message("Failed");
            Err(e).context("Stitching preparation failed")
        }
    }
}

/// Command-line flags take precedence over the config file.
fn apply_args(config: &mut StitchConfig, args: &RunArgs) {
    if let Some(ref data) = args.data {
        config.data_folder = data.clone();
    }
    if let Some(ref results) = args.results {
        config.results_folder = results.clone();
    }
    if let Some(ref root) = args.data_root {
        config.data_root = Some(root.clone());
    }
    if let Some(channel) = args.channel {
        config.channel = Some(ChannelWavelength(channel));
    }
    if let Some(target) = args.target {
        config.registration.target_resolution = target;
    }
    if args.downsample.is_some() {
        config.registration.downsample = args.downsample;
    }
    if args.parallel.is_some() {
        config.registration.parallel = args.parallel;
    }
    if args.relative_paths {
        config.descriptor.path_mode = PathMode::Relative;
    }
    if args.no_microns {
        config.descriptor.use_micron_units = false;
    }
}
