use chrono::Utc;
use tracing::info;

use crate::descriptor::{build_descriptor, DescriptorOptions};
use crate::error::Result;
use crate::io::inputs::{read_tile_records, CapsuleInputs};
use crate::io::outputs::{remove_stale, to_json_pretty, write_atomic, write_json, OutputPaths};
use crate::params::assemble_parameters_with;
use crate::provenance::{DataProcess, Processing};
use crate::tiles::select_channel;

use super::config::StitchConfig;
use super::helpers::{choose_downsample, choose_storage_root, detect_cpu_limit};
use super::types::{NoOpReporter, PipelineOutput, PipelineStage, ProgressReporter};

/// Run the full preparation pipeline with a progress reporter.
///
/// The parameter document is written last; its presence marks a complete
/// run. One left by an earlier run is removed before anything else is
/// written, so any error leaves it absent.
pub fn run_pipeline_reported(
    config: &StitchConfig,
    reporter: &dyn ProgressReporter,
) -> Result<PipelineOutput> {
    let start = Utc::now();

    reporter.begin_stage(PipelineStage::ValidatingInputs);
    let inputs = CapsuleInputs::load(&config.data_folder, config.channel)?;
    let channel = inputs.channel;
    let storage_root = choose_storage_root(config, inputs.remote_storage_root.as_deref())?;
    let paths = OutputPaths::new(&config.results_folder, &inputs.dataset_name, channel)?;
    remove_stale(&paths.parameters)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::FilteringTiles);
    let records = read_tile_records(&inputs.tile_metadata)?;
    let total_tiles = records.len();
    let tileset = select_channel(records, channel)?;
    write_json(&paths.tile_metadata, &tileset)?;
    info!(
        channel = channel.0,
        selected = tileset.len(),
        total = total_tiles,
        "Selected channel tiles"
    );
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::BuildingDescriptor);
    let options = DescriptorOptions {
        path_mode: config.descriptor.path_mode,
        use_micron_units: config.descriptor.use_micron_units,
        voxel_resolution: inputs.voxel_resolution,
    };
    let descriptor = build_descriptor(&tileset, &storage_root, &options)?;
    let descriptor_xml = descriptor.to_xml_bytes()?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::EstimatingDownsample);
    let (downsample, downsample_overridden) =
        choose_downsample(config, inputs.downsample_override, inputs.voxel_resolution)?;
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::AssemblingParameters);
    let parallel = config
        .registration
        .parallel
        .unwrap_or_else(detect_cpu_limit);
    let parameters = assemble_parameters_with(
        inputs.dataset_name.as_str(),
        paths.descriptor.to_string_lossy(),
        downsample,
        parallel,
        &config.parameters,
    );
    let parameters_json = to_json_pretty(&parameters)?;
    let parameters_location = paths.parameters.to_string_lossy().into_owned();
    let process = DataProcess::tile_alignment(
        &config.identity,
        &parameters,
        inputs.dataset_name.as_str(),
        parameters_location,
        start,
        Utc::now(),
    );
    let processing = Processing::new(&config.identity, vec![process]);
    reporter.finish_stage();

    reporter.begin_stage(PipelineStage::WritingOutputs);
    write_atomic(&paths.descriptor, &descriptor_xml)?;
    write_json(&paths.provenance, &processing)?;
    write_atomic(&paths.parameters, &parameters_json)?;
    reporter.finish_stage();

    info!(
        downsample,
        max_shift = parameters.phase_correlation_params.max_shift_in_x,
        parallel,
        output = %paths.parameters.display(),
        "Stitching parameters written"
    );

    Ok(PipelineOutput {
        dataset_name: inputs.dataset_name,
        channel,
        tile_count: descriptor.tile_count(),
        storage_root: descriptor.storage_root().to_string(),
        downsample_overridden,
        parameters,
        paths,
    })
}

/// Run the full preparation pipeline without progress reporting.
pub fn run_pipeline(config: &StitchConfig) -> Result<PipelineOutput> {
    run_pipeline_reported(config, &NoOpReporter)
}
