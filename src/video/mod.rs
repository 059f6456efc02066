//! Video generation module.

pub mod history;
pub mod providers;
mod types;
pub mod workflow;

pub use history::{extract_artifacts, HistoryEntry, JobStatus};
pub use types::{Artifact, CompletedJob, TextToVideoRequest, DEFAULT_MODEL, DEFAULT_SIZE};
pub use workflow::{Node, NodeMeta, Workflow};
