//! Upload-and-caption pipeline.
//!
//! - **state**: the observable run state and snapshot
//! - **orchestrator**: the sequential presign → upload → register → caption run

pub mod orchestrator;
pub mod state;

pub use orchestrator::{CaptionPipeline, PresignedUpload, RUN_ABANDONED};
pub use state::{RunSnapshot, RunState};
