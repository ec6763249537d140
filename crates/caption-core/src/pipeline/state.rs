//! Observable run state.

use crate::captions::CaptionRecord;

/// Where a pipeline run currently is.
///
/// Transitions are linear: `Idle → AwaitingPresign → Uploading →
/// RegisteringImage → GeneratingCaptions → Succeeded | Failed`, where a
/// failure may end the run from any in-flight state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RunState {
    #[default]
    Idle,
    AwaitingPresign,
    Uploading,
    RegisteringImage,
    GeneratingCaptions,
    Succeeded(Vec<CaptionRecord>),
    Failed(String),
}

impl RunState {
    /// True while a network step is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            RunState::AwaitingPresign
                | RunState::Uploading
                | RunState::RegisteringImage
                | RunState::GeneratingCaptions
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded(_) | RunState::Failed(_))
    }

    /// Short label for progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::AwaitingPresign => "requesting upload URL",
            RunState::Uploading => "uploading image",
            RunState::RegisteringImage => "registering image",
            RunState::GeneratingCaptions => "generating captions",
            RunState::Succeeded(_) => "done",
            RunState::Failed(_) => "failed",
        }
    }
}

/// Everything a caller can observe about the current (or last) run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSnapshot {
    pub state: RunState,
    /// Set once registration succeeds; kept even if captioning later fails.
    pub image_id: Option<String>,
}

impl RunSnapshot {
    pub fn captions(&self) -> &[CaptionRecord] {
        match &self.state {
            RunState::Succeeded(captions) => captions,
            _ => &[],
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            RunState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
