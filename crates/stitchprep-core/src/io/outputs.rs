//! Artifact writing.
//!
//! Every file is written to a `.partial` sibling first and renamed into place,
//! so a reader never observes a truncated artifact under its final name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::consts::PARTIAL_SUFFIX;
use crate::error::{Result, StitchError};
use crate::tiles::ChannelWavelength;

/// Final locations of one run's artifacts.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputPaths {
    pub tile_metadata: PathBuf,
    pub descriptor: PathBuf,
    pub parameters: PathBuf,
    pub provenance: PathBuf,
}

impl OutputPaths {
    /// Lay out a run under `results_folder`, which is made absolute so the
    /// descriptor reference inside the parameters resolves from anywhere.
    pub fn new(results_folder: &Path, dataset: &str, channel: ChannelWavelength) -> Result<Self> {
        let root = std::path::absolute(results_folder)
            .map_err(|e| StitchError::io_at(results_folder, e))?;
        Ok(Self {
            tile_metadata: root.join(format!("{dataset}_tile_metadata.json")),
            descriptor: root.join(format!("{dataset}_stitching_channel_{channel}.xml")),
            parameters: root.join(format!("{dataset}_stitch_channel_{channel}_params.json")),
            provenance: root.join("metadata").join("processing.json"),
        })
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Write `bytes` to `path`, creating parent directories as needed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StitchError::io_at(parent, e))?;
    }

    let partial = partial_path(path);
    fs::write(&partial, bytes).map_err(|e| StitchError::io_at(&partial, e))?;
    if let Err(e) = fs::rename(&partial, path) {
        let _ = fs::remove_file(&partial);
        return Err(StitchError::io_at(path, e));
    }

    debug!(path = %path.display(), bytes = bytes.len(), "Wrote artifact");
    Ok(())
}

/// Delete an artifact left by an earlier run. A missing file is fine.
pub fn remove_stale(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Removed stale artifact");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound || !path.exists() => Ok(()),
        Err(e) => Err(StitchError::io_at(path, e)),
    }
}

/// Serialize `value` as JSON with four-space indentation.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    write_atomic(path, &to_json_pretty(value)?)
}
