#[allow(dead_code)]
mod common;

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;

use stitchprep_core::error::StitchError;
use stitchprep_core::io::inputs::{CapsuleInputs, ACQUISITION, TILE_METADATA};
use stitchprep_core::params::StitchingParameters;
use stitchprep_core::pipeline::{
    run_pipeline, run_pipeline_reported, PipelineStage, ProgressReporter,
};
use stitchprep_core::provenance::Processing;
use stitchprep_core::tiles::ChannelWavelength;

fn capsule(channel: Value) -> TempDir {
    let dir = TempDir::new().unwrap();
    common::write_capsule(&dir.path().join("data"), &common::two_channel_tiles(), channel);
    dir
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_full_pipeline_end_to_end() {
    let dir = capsule(json!(488));
    let config = common::config_for(dir.path());

    let output = run_pipeline(&config).unwrap();

    assert_eq!(output.dataset_name, common::DATASET);
    assert_eq!(output.channel.0, 488);
    assert_eq!(output.tile_count, 5);
    assert_eq!(
        output.storage_root,
        format!(
            "s3://{}/{}/image_radial_correction",
            common::BUCKET,
            common::PROCESSED_ASSET
        )
    );
    assert!(!output.downsample_overridden);

    // Filtered tiles
    let tiles = read_json(&output.paths.tile_metadata);
    let tiles = tiles.as_array().unwrap();
    assert_eq!(tiles.len(), 5);
    assert!(tiles
        .iter()
        .all(|t| t["channel_wavelength"] == json!(488)
            && t["file"].as_str().unwrap().ends_with("_ch_488.ome.zarr")));

    // Descriptor
    let xml = fs::read_to_string(&output.paths.descriptor).unwrap();
    assert!(xml.contains(&format!(">{}</zarr>", output.storage_root)));
    assert_eq!(xml.matches("<ViewSetup>").count(), 5);

    // Parameters
    let params: StitchingParameters =
        serde_json::from_str(&fs::read_to_string(&output.paths.parameters).unwrap()).unwrap();
    assert_eq!(params, output.parameters);
    assert_eq!(params.session_id, common::DATASET);
    assert_eq!(params.parallel, 8);
    assert_eq!(params.dataset_xml, output.paths.descriptor.to_string_lossy());
    assert!(Path::new(&params.dataset_xml).is_absolute());
    let pc = &params.phase_correlation_params;
    assert_eq!(pc.downsample, 2);
    assert_eq!(pc.max_shift_in_x, 33);
    assert_eq!(pc.max_shift_in_y, 33);
    assert_eq!(pc.max_shift_in_z, 33);

    // Provenance
    let processing: Processing = serde_json::from_str(
        &fs::read_to_string(&output.paths.provenance).unwrap(),
    )
    .unwrap();
    let process = &processing.processing_pipeline.data_processes[0];
    assert_eq!(process.name, "Image tile alignment");
    assert_eq!(process.software_version, "1.2.11");
    assert_eq!(process.parameters, params);
    assert_eq!(process.input_location, common::DATASET);
    assert_eq!(
        process.outputs.get("output_file").map(String::as_str),
        Some(process.output_location.as_str())
    );
    assert!(process.start_date_time <= process.end_date_time);

    // No partial files left behind
    let leftovers: Vec<_> = fs::read_dir(common::results_dir(dir.path()))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_output_file_names() {
    let dir = capsule(json!("561"));
    let output = run_pipeline(&common::config_for(dir.path())).unwrap();
    let results = fs::canonicalize(common::results_dir(dir.path())).unwrap();
    let name = |p: &Path| p.file_name().unwrap().to_string_lossy().into_owned();

    assert_eq!(
        name(&output.paths.descriptor),
        format!("{}_stitching_channel_561.xml", common::DATASET)
    );
    assert_eq!(
        name(&output.paths.parameters),
        format!("{}_stitch_channel_561_params.json", common::DATASET)
    );
    assert!(results.join("metadata").join("processing.json").exists());
}

#[test]
fn test_local_data_root_is_made_absolute() {
    let dir = capsule(json!(488));
    let mut config = common::config_for(dir.path());
    config.data_root = Some("local/relative/tiles".into());

    let output = run_pipeline(&config).unwrap();
    assert!(Path::new(&output.storage_root).is_absolute());
    assert!(output.storage_root.ends_with("local/relative/tiles"));
}

#[test]
fn test_downsample_override_from_config() {
    let dir = capsule(json!(488));
    let mut config = common::config_for(dir.path());
    config.registration.downsample = Some(0);

    let output = run_pipeline(&config).unwrap();
    assert!(output.downsample_overridden);
    assert_eq!(output.parameters.phase_correlation_params.downsample, 0);
    assert_eq!(output.parameters.phase_correlation_params.max_shift_in_x, 100);
}

#[test]
fn test_downsample_override_from_manifest() {
    let dir = capsule(json!(488));
    common::write_json(
        &dir.path().join("data").join("processing_manifest.json"),
        &json!({ "pipeline_processing": { "stitching": { "channel": 488, "downsample": 1 } } }),
    );

    let output = run_pipeline(&common::config_for(dir.path())).unwrap();
    assert!(output.downsample_overridden);
    assert_eq!(output.parameters.phase_correlation_params.max_shift_in_x, 50);
}

#[test]
fn test_missing_inputs_reported_together() {
    let dir = capsule(json!(488));
    let data = dir.path().join("data");
    fs::remove_file(data.join(TILE_METADATA)).unwrap();
    fs::remove_file(data.join(ACQUISITION)).unwrap();

    let err = run_pipeline(&common::config_for(dir.path())).unwrap_err();
    match err {
        StitchError::MissingInputs(missing) => {
            assert_eq!(missing.len(), 2);
            assert!(missing.contains(&data.join(TILE_METADATA)));
            assert!(missing.contains(&data.join(ACQUISITION)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!common::results_dir(dir.path()).exists());
}

#[test]
fn test_empty_channel_aborts_before_parameters() {
    let dir = capsule(json!(639));
    let err = run_pipeline(&common::config_for(dir.path())).unwrap_err();
    assert!(matches!(err, StitchError::EmptyChannelSelection(639)));

    let params = common::results_dir(dir.path())
        .join(format!("{}_stitch_channel_639_params.json", common::DATASET));
    assert!(!params.exists());
}

#[test]
fn test_finer_target_aborts_before_parameters() {
    let dir = capsule(json!(488));
    let mut config = common::config_for(dir.path());
    config.registration.target_resolution = [0.1, 0.76, 3.4];

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, StitchError::MalformedResolution { axis: 'x', .. }));
    let params = common::results_dir(dir.path())
        .join(format!("{}_stitch_channel_488_params.json", common::DATASET));
    assert!(!params.exists());
}

#[test]
fn test_missing_storage_root() {
    let dir = capsule(json!(488));
    common::write_json(
        &dir.path().join("data").join("radial_correction_parameters.json"),
        &json!({}),
    );
    let err = run_pipeline(&common::config_for(dir.path())).unwrap_err();
    assert!(matches!(err, StitchError::MissingStorageRoot));
}

#[test]
fn test_capsule_inputs_load() {
    let dir = capsule(json!("488"));
    let inputs = CapsuleInputs::load(&dir.path().join("data"), None).unwrap();
    assert_eq!(inputs.dataset_name, common::DATASET);
    assert_eq!(inputs.channel.0, 488);
    assert_eq!(inputs.voxel_resolution.to_array(), [0.19, 0.19, 0.85]);
    assert_eq!(inputs.downsample_override, None);
}

#[test]
fn test_config_channel_skips_manifest_channel() {
    let dir = capsule(json!("not-a-wavelength"));
    let inputs =
        CapsuleInputs::load(&dir.path().join("data"), Some(ChannelWavelength(561))).unwrap();
    assert_eq!(inputs.channel, ChannelWavelength(561));

    let mut config = common::config_for(dir.path());
    config.channel = Some(ChannelWavelength(561));
    let output = run_pipeline(&config).unwrap();
    assert_eq!(output.tile_count, 5);
    assert!(output.paths.parameters.exists());
}

#[test]
fn test_failed_rerun_removes_previous_parameters() {
    let dir = capsule(json!(488));
    let first = run_pipeline(&common::config_for(dir.path())).unwrap();
    assert!(first.paths.parameters.exists());

    let mut config = common::config_for(dir.path());
    config.registration.target_resolution = [0.1, 0.76, 3.4];
    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, StitchError::MalformedResolution { axis: 'x', .. }));

    assert!(first.paths.tile_metadata.exists());
    assert!(!first.paths.parameters.exists());
}

#[test]
fn test_write_failure_leaves_no_parameters() {
    let dir = capsule(json!(488));
    let first = run_pipeline(&common::config_for(dir.path())).unwrap();
    assert!(first.paths.parameters.exists());

    // A plain file where the provenance folder belongs makes that write fail
    // after the descriptor has already landed.
    let metadata_dir = common::results_dir(dir.path()).join("metadata");
    fs::remove_dir_all(&metadata_dir).unwrap();
    fs::write(&metadata_dir, b"").unwrap();

    let err = run_pipeline(&common::config_for(dir.path())).unwrap_err();
    assert!(matches!(err, StitchError::IoAt { .. }), "got: {err}");
    assert!(first.paths.descriptor.exists());
    assert!(!first.paths.parameters.exists());
}

#[test]
fn test_unwritable_results_folder_leaves_no_parameters() {
    let dir = capsule(json!(488));
    let results = common::results_dir(dir.path());
    fs::write(&results, b"").unwrap();

    let err = run_pipeline(&common::config_for(dir.path())).unwrap_err();
    assert!(matches!(err, StitchError::IoAt { .. }), "got: {err}");
    let params = results.join(format!("{}_stitch_channel_488_params.json", common::DATASET));
    assert!(!params.exists());
}

#[derive(Default)]
struct RecordingReporter {
    stages: RefCell<Vec<PipelineStage>>,
    finished: RefCell<usize>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: PipelineStage) {
        self.stages.borrow_mut().push(stage);
    }

    fn finish_stage(&self) {
        *self.finished.borrow_mut() += 1;
    }
}

#[test]
fn test_reporter_sees_every_stage() {
    let dir = capsule(json!(488));
    let reporter = RecordingReporter::default();
    run_pipeline_reported(&common::config_for(dir.path()), &reporter).unwrap();

    assert_eq!(reporter.stages.borrow().as_slice(), PipelineStage::ALL);
    assert_eq!(*reporter.finished.borrow(), PipelineStage::ALL.len());
}
