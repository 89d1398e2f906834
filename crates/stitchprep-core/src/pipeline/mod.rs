pub mod config;
mod helpers;
mod orchestrator;
mod types;

pub use helpers::{detect_cpu_limit, parse_cpu_limit};
pub use orchestrator::{run_pipeline, run_pipeline_reported};
pub use types::{PipelineOutput, PipelineStage, ProgressReporter};
