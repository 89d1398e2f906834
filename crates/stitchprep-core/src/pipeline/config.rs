use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_TARGET_RESOLUTION;
use crate::descriptor::PathMode;
use crate::params::ParameterOverrides;
use crate::provenance::PipelineIdentity;
use crate::tiles::ChannelWavelength;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StitchConfig {
    /// Capsule folder holding the upstream JSON documents.
    #[serde(default = "default_data_folder")]
    pub data_folder: PathBuf,
    #[serde(default = "default_results_folder")]
    pub results_folder: PathBuf,
    /// Tile storage root (local path or `scheme://` URI). Takes precedence
    /// over the object-storage root derived from the capsule documents.
    #[serde(default)]
    pub data_root: Option<String>,
    /// Channel to stitch instead of the processing manifest's choice.
    #[serde(default)]
    pub channel: Option<ChannelWavelength>,
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    pub descriptor: DescriptorConfig,
    #[serde(default)]
    pub parameters: ParameterOverrides,
    #[serde(default)]
    pub identity: PipelineIdentity,
}

fn default_data_folder() -> PathBuf {
    PathBuf::from("data")
}

fn default_results_folder() -> PathBuf {
    PathBuf::from("results")
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            data_folder: default_data_folder(),
            results_folder: default_results_folder(),
            data_root: None,
            channel: None,
            registration: RegistrationConfig::default(),
            descriptor: DescriptorConfig::default(),
            parameters: ParameterOverrides::default(),
            identity: PipelineIdentity::default(),
        }
    }
}

impl StitchConfig {
    pub fn from_toml(contents: &str) -> crate::error::Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// How the registration resolution level is chosen.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegistrationConfig {
    /// Physical resolution (X, Y, Z) the registration imagery should approximate.
    #[serde(default = "default_target_resolution")]
    pub target_resolution: [f64; 3],
    /// Explicit pyramid level. Skips estimation when set.
    #[serde(default)]
    pub downsample: Option<u32>,
    /// Worker count for the engine. Detected from the environment when unset.
    #[serde(default)]
    pub parallel: Option<usize>,
}

fn default_target_resolution() -> [f64; 3] {
    DEFAULT_TARGET_RESOLUTION
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            target_resolution: DEFAULT_TARGET_RESOLUTION,
            downsample: None,
            parallel: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DescriptorConfig {
    #[serde(default)]
    pub path_mode: PathMode,
    #[serde(default = "default_use_micron_units")]
    pub use_micron_units: bool,
}

fn default_use_micron_units() -> bool {
    true
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            path_mode: PathMode::default(),
            use_micron_units: true,
        }
    }
}
