use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StitchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("I/O error at {}: {source}", .path.display())]
    IoAt {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("XML write error: {0}")]
    Xml(String),

    #[error("Missing capsule inputs: {}", display_paths(.0))]
    MissingInputs(Vec<PathBuf>),

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Invalid voxel resolution on axis {axis}: {value}")]
    InvalidResolution { axis: char, value: f64 },

    #[error(
        "Target resolution {target} is finer than base resolution {voxel} on axis {axis}"
    )]
    MalformedResolution { axis: char, voxel: f64, target: f64 },

    #[error("No tiles match channel {0}")]
    EmptyChannelSelection(i64),

    #[error("No storage root: set `data_root` or provide bucket and asset names")]
    MissingStorageRoot,
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StitchError {
    /// Attach the offending path to an I/O error.
    pub fn io_at(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IoAt {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, StitchError>;
