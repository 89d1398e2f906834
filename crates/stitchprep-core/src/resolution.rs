//! Physical voxel sizes and the pyramid level matching a target resolution.
//!
//! Multiscale tile pyramids halve every axis at each level, so the level is
//! shared across X, Y and Z even when the per-axis ratios differ.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::LOG2_SNAP_ULPS;
use crate::error::{Result, StitchError};

const AXES: [char; 3] = ['x', 'y', 'z'];

/// Physical size of one voxel in (X, Y, Z) order.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct VoxelResolution {
    x: f64,
    y: f64,
    z: f64,
}

impl VoxelResolution {
    /// Every component must be finite and strictly positive.
    pub fn new(x: f64, y: f64, z: f64) -> Result<Self> {
        for (axis, value) in AXES.into_iter().zip([x, y, z]) {
            if !value.is_finite() || value <= 0.0 {
                return Err(StitchError::InvalidResolution { axis, value });
            }
        }
        Ok(Self { x, y, z })
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn z(&self) -> f64 {
        self.z
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

impl TryFrom<[f64; 3]> for VoxelResolution {
    type Error = StitchError;

    fn try_from(v: [f64; 3]) -> Result<Self> {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<VoxelResolution> for [f64; 3] {
    fn from(r: VoxelResolution) -> Self {
        r.to_array()
    }
}

impl fmt::Display for VoxelResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Pyramid level at which registration imagery approximates `target`.
///
/// Per axis the level is `floor(log2(target / voxel))`; the result is the
/// maximum over axes. A target finer than the base resolution on any axis
/// is rejected rather than clamped.
pub fn estimate_downsample(voxel: VoxelResolution, target: VoxelResolution) -> Result<u32> {
    let mut level = 0u32;
    for ((axis, base), goal) in AXES
        .into_iter()
        .zip(voxel.to_array())
        .zip(target.to_array())
    {
        if goal < base {
            return Err(StitchError::MalformedResolution {
                axis,
                voxel: base,
                target: goal,
            });
        }
        level = level.max(floor_log2(goal / base));
    }
    Ok(level)
}

/// `floor(log2(ratio))` for `ratio >= 1`. An exponent within a few ULPs of
/// an integer counts as that integer, so rounding noise in the division
/// cannot drop a level.
fn floor_log2(ratio: f64) -> u32 {
    let exponent = ratio.log2();
    let nearest = exponent.round();
    let snap = LOG2_SNAP_ULPS * f64::EPSILON * nearest.abs().max(1.0);
    if (exponent - nearest).abs() <= snap {
        nearest as u32
    } else {
        exponent.floor() as u32
    }
}
