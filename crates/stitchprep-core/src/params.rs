//! Parameter record handed to the registration engine.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_MEMGB, DEFAULT_MIN_CORRELATION, MAX_SHIFT_BASE};

/// Phase-correlation settings for pairwise tile registration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseCorrelationParams {
    pub downsample: u32,
    pub min_correlation: f64,
    pub max_shift_in_x: u32,
    pub max_shift_in_y: u32,
    pub max_shift_in_z: u32,
}

/// Full engine parameter record. Built once per run, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StitchingParameters {
    pub session_id: String,
    pub memgb: u32,
    pub parallel: usize,
    pub dataset_xml: String,
    pub do_phase_correlation: bool,
    pub do_detection: bool,
    pub do_registrations: bool,
    pub phase_correlation_params: PhaseCorrelationParams,
}

/// Caller overrides of the fixed policy defaults.
///
/// The defaults select translation-only phase correlation with interest
/// point detection and global registration switched off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterOverrides {
    pub memgb: u32,
    pub min_correlation: f64,
    pub do_phase_correlation: bool,
    pub do_detection: bool,
    pub do_registrations: bool,
}

impl Default for ParameterOverrides {
    fn default() -> Self {
        Self {
            memgb: DEFAULT_MEMGB,
            min_correlation: DEFAULT_MIN_CORRELATION,
            do_phase_correlation: true,
            do_detection: false,
            do_registrations: false,
        }
    }
}

/// Search window per axis at a given pyramid level.
pub fn max_shift_for(downsample: u32) -> u32 {
    MAX_SHIFT_BASE / downsample.saturating_add(1)
}

/// Assemble the record with the default policy.
pub fn assemble_parameters(
    session_id: impl Into<String>,
    descriptor_location: impl Into<String>,
    downsample: u32,
    parallel: usize,
) -> StitchingParameters {
    assemble_parameters_with(
        session_id,
        descriptor_location,
        downsample,
        parallel,
        &ParameterOverrides::default(),
    )
}

pub fn assemble_parameters_with(
    session_id: impl Into<String>,
    descriptor_location: impl Into<String>,
    downsample: u32,
    parallel: usize,
    overrides: &ParameterOverrides,
) -> StitchingParameters {
    let max_shift = max_shift_for(downsample);
    StitchingParameters {
        session_id: session_id.into(),
        memgb: overrides.memgb,
        parallel,
        dataset_xml: descriptor_location.into(),
        do_phase_correlation: overrides.do_phase_correlation,
        do_detection: overrides.do_detection,
        do_registrations: overrides.do_registrations,
        phase_correlation_params: PhaseCorrelationParams {
            downsample,
            min_correlation: overrides.min_correlation,
            max_shift_in_x: max_shift,
            max_shift_in_y: max_shift,
            max_shift_in_z: max_shift,
        },
    }
}
