use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StitchError};

/// How the engine should interpret the image loader's root reference.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathMode {
    #[default]
    Absolute,
    Relative,
}

impl PathMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Relative => "relative",
        }
    }
}

impl fmt::Display for PathMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` for `<scheme>://...` references such as `s3://bucket/key`.
pub fn is_remote_uri(root: &str) -> bool {
    let Some((scheme, _)) = root.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Remote URIs pass through untouched; local paths become absolute.
///
/// Existing paths are fully canonicalized (symlinks resolved). Paths that do
/// not exist yet are made absolute against the current directory.
pub fn resolve_storage_root(root: &str) -> Result<String> {
    if is_remote_uri(root) {
        return Ok(root.to_string());
    }
    if root.trim().is_empty() {
        return Err(StitchError::MissingStorageRoot);
    }

    let path = Path::new(root);
    let absolute = match std::fs::canonicalize(path) {
        Ok(p) => p,
        Err(_) => std::path::absolute(path).map_err(|e| StitchError::io_at(path, e))?,
    };
    Ok(absolute.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_object_storage_schemes() {
        assert!(is_remote_uri("s3://bucket/asset/image_radial_correction"));
        assert!(is_remote_uri("gs://bucket/key"));
        assert!(is_remote_uri("https://host/data.zarr"));
        assert!(!is_remote_uri("/data/tiles"));
        assert!(!is_remote_uri("relative/tiles"));
        assert!(!is_remote_uri("://missing-scheme"));
        assert!(!is_remote_uri("3d://bad"));
    }

    #[test]
    fn path_mode_serializes_lowercase() {
        let json = serde_json::to_string(&PathMode::Relative).unwrap();
        assert_eq!(json, "\"relative\"");
    }
}
