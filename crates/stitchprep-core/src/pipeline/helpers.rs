use std::num::NonZeroUsize;

use tracing::{debug, warn};

use crate::consts::CPU_LIMIT_ENV;
use crate::error::{Result, StitchError};
use crate::resolution::{estimate_downsample, VoxelResolution};

use super::config::StitchConfig;

/// Parse a CPU quota value. Only positive integers are accepted.
pub fn parse_cpu_limit(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// CPUs available to the engine: the container quota when exported,
/// otherwise the host's available parallelism.
pub fn detect_cpu_limit() -> usize {
    let quota = std::env::var(CPU_LIMIT_ENV).ok();
    if let Some(n) = parse_cpu_limit(quota.as_deref()) {
        return n;
    }
    if quota.is_some() {
        warn!(var = CPU_LIMIT_ENV, value = ?quota, "Ignoring unparseable CPU limit");
    }
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Config `data_root` first, then the root derived from capsule documents.
pub(super) fn choose_storage_root(config: &StitchConfig, remote: Option<&str>) -> Result<String> {
    config
        .data_root
        .as_deref()
        .or(remote)
        .map(str::to_string)
        .ok_or(StitchError::MissingStorageRoot)
}

/// Explicit level (config, then manifest) or the estimate from resolutions.
///
/// Returns the level and whether it was overridden.
pub(super) fn choose_downsample(
    config: &StitchConfig,
    manifest_override: Option<u32>,
    voxel: VoxelResolution,
) -> Result<(u32, bool)> {
    if let Some(level) = config.registration.downsample.or(manifest_override) {
        debug!(level, "Using explicit downsample");
        return Ok((level, true));
    }
    let target = VoxelResolution::try_from(config.registration.target_resolution)?;
    let level = estimate_downsample(voxel, target)?;
    debug!(level, voxel = %voxel, target = %target, "Estimated downsample");
    Ok((level, false))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_limit_parsing() {
        assert_eq!(parse_cpu_limit(Some("16")), Some(16));
        assert_eq!(parse_cpu_limit(Some(" 8 ")), Some(8));
        assert_eq!(parse_cpu_limit(Some("0")), None);
        assert_eq!(parse_cpu_limit(Some("eight")), None);
        assert_eq!(parse_cpu_limit(None), None);
    }

    #[test]
    fn storage_root_prefers_config() {
        let mut config = StitchConfig::default();
        assert!(matches!(
            choose_storage_root(&config, None),
            Err(StitchError::MissingStorageRoot)
        ));
        assert_eq!(
            choose_storage_root(&config, Some("s3://b/a/image_radial_correction")).unwrap(),
            "s3://b/a/image_radial_correction"
        );
        config.data_root = Some("/local/tiles".into());
        assert_eq!(
            choose_storage_root(&config, Some("s3://b/a")).unwrap(),
            "/local/tiles"
        );
    }

    #[test]
    fn downsample_override_precedence() {
        let voxel = VoxelResolution::new(0.19, 0.19, 0.85).unwrap();
        let mut config = StitchConfig::default();
        assert_eq!(choose_downsample(&config, None, voxel).unwrap(), (2, false));
        assert_eq!(choose_downsample(&config, Some(3), voxel).unwrap(), (3, true));
        config.registration.downsample = Some(1);
        assert_eq!(choose_downsample(&config, Some(3), voxel).unwrap(), (1, true));
    }
}
