pub mod orchestrator;

pub use orchestrator::{Pipeline, PipelineError, RunSummary};
