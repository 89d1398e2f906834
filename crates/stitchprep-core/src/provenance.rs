//! Process-metadata record written alongside every run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_ENGINE_VERSION;
use crate::params::StitchingParameters;

const PROCESSING_SCHEMA_VERSION: &str = "1.1.1";
const TILE_ALIGNMENT_PROCESS: &str = "Image tile alignment";
const PARAMETER_NOTES: &str = "Creation of stitching parameters";

/// Who and what produced a run. Populated once at process start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineIdentity {
    pub code_version: String,
    pub pipeline_version: String,
    pub processor_full_name: String,
    pub code_url: String,
    /// Version of the registration engine the parameters target.
    pub engine_version: String,
}

impl Default for PipelineIdentity {
    fn default() -> Self {
        Self {
            code_version: env!("CARGO_PKG_VERSION").to_string(),
            pipeline_version: env!("CARGO_PKG_VERSION").to_string(),
            processor_full_name: String::new(),
            code_url: String::new(),
            engine_version: DEFAULT_ENGINE_VERSION.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataProcess {
    pub name: String,
    pub software_version: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
    pub input_location: String,
    pub output_location: String,
    pub outputs: BTreeMap<String, String>,
    pub code_url: String,
    pub code_version: String,
    pub parameters: StitchingParameters,
    pub notes: String,
}

impl DataProcess {
    /// Tile-alignment entry for a parameter document written to `output`.
    pub fn tile_alignment(
        identity: &PipelineIdentity,
        parameters: &StitchingParameters,
        input_location: impl Into<String>,
        output: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        let output = output.into();
        Self {
            name: TILE_ALIGNMENT_PROCESS.to_string(),
            software_version: identity.engine_version.clone(),
            start_date_time: start,
            end_date_time: end,
            input_location: input_location.into(),
            output_location: output.clone(),
            outputs: BTreeMap::from([("output_file".to_string(), output)]),
            code_url: identity.code_url.clone(),
            code_version: identity.code_version.clone(),
            parameters: parameters.clone(),
            notes: PARAMETER_NOTES.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessingPipeline {
    pub data_processes: Vec<DataProcess>,
    pub processor_full_name: String,
    pub pipeline_version: String,
}

/// Top-level provenance document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Processing {
    pub schema_version: String,
    pub processing_pipeline: ProcessingPipeline,
}

impl Processing {
    pub fn new(identity: &PipelineIdentity, data_processes: Vec<DataProcess>) -> Self {
        Self {
            schema_version: PROCESSING_SCHEMA_VERSION.to_string(),
            processing_pipeline: ProcessingPipeline {
                data_processes,
                processor_full_name: identity.processor_full_name.clone(),
                pipeline_version: identity.pipeline_version.clone(),
            },
        }
    }
}
