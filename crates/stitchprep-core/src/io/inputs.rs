//! Capsule input discovery.
//!
//! A capsule data folder holds a fixed set of JSON documents written by the
//! upstream pipeline steps. Their presence is checked up front so every
//! missing file is reported at once.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Result, StitchError};
use crate::resolution::VoxelResolution;
use crate::tiles::{parse_tile_records, ChannelWavelength, TileRecord};

pub const PROCESSING_MANIFEST: &str = "processing_manifest.json";
pub const TILE_METADATA: &str = "all_channel_tile_metadata.json";
pub const DATA_DESCRIPTION: &str = "data_description.json";
pub const ACQUISITION: &str = "acquisition.json";
pub const PROCESSED_DATA_DESCRIPTION: &str = "processed_data_description.json";
pub const RADIAL_CORRECTION_PARAMETERS: &str = "radial_correction_parameters.json";

/// Documents a capsule data folder must contain.
pub const REQUIRED_INPUTS: [&str; 6] = [
    PROCESSING_MANIFEST,
    TILE_METADATA,
    DATA_DESCRIPTION,
    ACQUISITION,
    PROCESSED_DATA_DESCRIPTION,
    RADIAL_CORRECTION_PARAMETERS,
];

/// Folder (under the processed asset) holding the flat-field corrected tiles.
const RADIAL_CORRECTION_PREFIX: &str = "image_radial_correction";

/// Paths among `paths` that do not exist.
pub fn missing_inputs<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    paths
        .iter()
        .map(|p| p.as_ref().to_path_buf())
        .filter(|p| !p.exists())
        .collect()
}

/// Fail with every missing required document listed.
pub fn validate_capsule_inputs(data_folder: &Path) -> Result<()> {
    let required: Vec<PathBuf> = REQUIRED_INPUTS
        .iter()
        .map(|name| data_folder.join(name))
        .collect();
    let missing = missing_inputs(&required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(StitchError::MissingInputs(missing))
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|e| StitchError::io_at(path, e))?;
    serde_json::from_str(&contents).map_err(|e| {
        StitchError::MalformedInput(format!("{}: {e}", path.display()))
    })
}

/// Read and normalize a tile-metadata array.
pub fn read_tile_records(path: &Path) -> Result<Vec<TileRecord>> {
    let document: Value = read_json(path)?;
    parse_tile_records(document)
}

#[derive(Debug, Deserialize)]
struct ProcessingManifest {
    pipeline_processing: PipelineProcessing,
}

#[derive(Debug, Deserialize)]
struct PipelineProcessing {
    stitching: StitchingSection,
}

#[derive(Debug, Deserialize)]
struct StitchingSection {
    channel: Value,
    #[serde(default)]
    downsample: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct NamedDocument {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RadialCorrectionParameters {
    #[serde(default)]
    bucket_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Acquisition {
    tiles: Vec<AcquisitionTile>,
}

#[derive(Debug, Deserialize)]
struct AcquisitionTile {
    coordinate_transformations: Vec<CoordinateTransformation>,
}

#[derive(Debug, Deserialize)]
struct CoordinateTransformation {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    scale: Option<Vec<Value>>,
}

/// Voxel size recorded for the first acquisition tile.
///
/// All tiles of an acquisition share one resolution. Scale components may be
/// written as numbers or as decimal strings.
fn acquisition_resolution(acquisition: &Acquisition) -> Result<VoxelResolution> {
    let malformed = |msg: &str| StitchError::MalformedInput(format!("{ACQUISITION}: {msg}"));

    let tile = acquisition
        .tiles
        .first()
        .ok_or_else(|| malformed("no tiles"))?;
    let scale = tile
        .coordinate_transformations
        .iter()
        .find(|t| t.kind == "scale")
        .and_then(|t| t.scale.as_ref())
        .ok_or_else(|| malformed("first tile has no scale transformation"))?;

    let values: Vec<f64> = scale
        .iter()
        .map(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect::<Option<_>>()
        .ok_or_else(|| malformed("scale must hold numbers"))?;

    match values.as_slice() {
        [x, y, z, ..] => VoxelResolution::new(*x, *y, *z),
        _ => Err(malformed("scale needs three components")),
    }
}

/// Everything the pipeline needs from a capsule data folder.
#[derive(Clone, Debug)]
pub struct CapsuleInputs {
    pub tile_metadata: PathBuf,
    pub dataset_name: String,
    pub channel: ChannelWavelength,
    pub downsample_override: Option<u32>,
    pub voxel_resolution: VoxelResolution,
    /// Object-storage root of the corrected tiles, when the upstream
    /// documents name both the bucket and the processed asset.
    pub remote_storage_root: Option<String>,
}

impl CapsuleInputs {
    /// Validate and read a capsule data folder. The manifest's channel is
    /// only parsed when `channel_override` is `None`.
    pub fn load(data_folder: &Path, channel_override: Option<ChannelWavelength>) -> Result<Self> {
        validate_capsule_inputs(data_folder)?;

        let manifest: ProcessingManifest = read_json(&data_folder.join(PROCESSING_MANIFEST))?;
        let description: NamedDocument = read_json(&data_folder.join(DATA_DESCRIPTION))?;
        let acquisition: Acquisition = read_json(&data_folder.join(ACQUISITION))?;
        let processed: NamedDocument = read_json(&data_folder.join(PROCESSED_DATA_DESCRIPTION))?;
        let radial: RadialCorrectionParameters =
            read_json(&data_folder.join(RADIAL_CORRECTION_PARAMETERS))?;

        let dataset_name = description.name.ok_or_else(|| {
            StitchError::MalformedInput(format!("{DATA_DESCRIPTION}: missing `name`"))
        })?;
        let stitching = manifest.pipeline_processing.stitching;
        let channel = match channel_override {
            Some(channel) => channel,
            None => ChannelWavelength::from_value(&stitching.channel)?,
        };
        let voxel_resolution = acquisition_resolution(&acquisition)?;

        let remote_storage_root = match (radial.bucket_name, processed.name) {
            (Some(bucket), Some(asset)) => {
                Some(format!("s3://{bucket}/{asset}/{RADIAL_CORRECTION_PREFIX}"))
            }
            _ => None,
        };

        info!(
            dataset = %dataset_name,
            channel = channel.0,
            voxel = %voxel_resolution,
            "Loaded capsule inputs"
        );
        debug!(storage_root = ?remote_storage_root, downsample = ?stitching.downsample);

        Ok(Self {
            tile_metadata: data_folder.join(TILE_METADATA),
            dataset_name,
            channel,
            downsample_override: stitching.downsample,
            voxel_resolution,
            remote_storage_root,
        })
    }
}
