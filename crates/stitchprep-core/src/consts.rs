/// Canonical multiscale image suffix appended to every tile file.
pub const CANONICAL_TILE_SUFFIX: &str = ".ome.zarr";

/// Target physical resolution (X, Y, Z) in micrometers at which
/// phase-correlation registration should run.
pub const DEFAULT_TARGET_RESOLUTION: [f64; 3] = [0.76, 0.76, 3.4];

/// Distance, in ULPs of the exponent, within which `log2(ratio)` is snapped
/// to the nearest integer before flooring.
pub const LOG2_SNAP_ULPS: f64 = 4.0;

/// Search window (pixels per axis) at pyramid level 0. Shrinks as
/// `MAX_SHIFT_BASE / (downsample + 1)` at coarser levels.
pub const MAX_SHIFT_BASE: u32 = 100;

/// Memory budget handed to the registration engine, in GB.
pub const DEFAULT_MEMGB: u32 = 100;

/// Minimum normalized cross-correlation for a pairwise link to be kept.
pub const DEFAULT_MIN_CORRELATION: f64 = 0.6;

/// Environment variable carrying the container CPU quota.
pub const CPU_LIMIT_ENV: &str = "CO_CPUS";

/// Version of the external registration engine stamped on provenance.
pub const DEFAULT_ENGINE_VERSION: &str = "1.2.11";

/// Suffix appended to a path while an artifact is being written.
pub const PARTIAL_SUFFIX: &str = "partial";

/// Unit label attached to calibration when micron units are requested.
pub const MICRON_UNIT: &str = "µm";

/// Unit label attached to calibration in raw mode.
pub const RAW_UNIT: &str = "pixel";
