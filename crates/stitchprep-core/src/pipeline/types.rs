use std::fmt;

use crate::io::outputs::OutputPaths;
use crate::params::StitchingParameters;
use crate::tiles::ChannelWavelength;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    ValidatingInputs,
    FilteringTiles,
    BuildingDescriptor,
    EstimatingDownsample,
    AssemblingParameters,
    WritingOutputs,
}

impl PipelineStage {
    /// Every stage, in execution order.
    pub const ALL: [PipelineStage; 6] = [
        Self::ValidatingInputs,
        Self::FilteringTiles,
        Self::BuildingDescriptor,
        Self::EstimatingDownsample,
        Self::AssemblingParameters,
        Self::WritingOutputs,
    ];
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidatingInputs => write!(f, "Validating inputs"),
            Self::FilteringTiles => write!(f, "Filtering tiles"),
            Self::BuildingDescriptor => write!(f, "Building descriptor"),
            Self::EstimatingDownsample => write!(f, "Estimating downsample"),
            Self::AssemblingParameters => write!(f, "Assembling parameters"),
            Self::WritingOutputs => write!(f, "Writing outputs"),
        }
    }
}

/// What a completed run produced.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub dataset_name: String,
    pub channel: ChannelWavelength,
    pub tile_count: usize,
    /// Storage root as embedded in the descriptor.
    pub storage_root: String,
    /// `true` when the downsample level came from an explicit override.
    pub downsample_overridden: bool,
    pub parameters: StitchingParameters,
    pub paths: OutputPaths,
}

/// Progress reporting for the pipeline.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn begin_stage(&self, _stage: PipelineStage) {}

    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
