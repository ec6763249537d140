//! Output records for completed runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::captions::CaptionRecord;
use crate::pipeline::RunSnapshot;
use crate::upload::UploadCandidate;

/// The outcome of one pipeline run, as written by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// File name of the uploaded image
    pub file_name: String,

    /// Declared content type
    pub content_type: String,

    /// Backend image id, if registration got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,

    /// Generated captions (empty on failure)
    pub captions: Vec<CaptionEntry>,

    /// Failure message, if the run failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A caption's display text alongside the record it was taken from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionEntry {
    pub text: String,
    pub record: Value,
}

impl From<&CaptionRecord> for CaptionEntry {
    fn from(record: &CaptionRecord) -> Self {
        Self {
            text: record.display_text(),
            record: record.raw().clone(),
        }
    }
}

impl RunReport {
    /// Build a report from a finished run's snapshot.
    pub fn from_snapshot(candidate: &UploadCandidate, snapshot: &RunSnapshot) -> Self {
        Self {
            file_name: candidate.name.clone(),
            content_type: candidate.content_type.clone(),
            image_id: snapshot.image_id.clone(),
            captions: snapshot.captions().iter().map(CaptionEntry::from).collect(),
            error: snapshot.error_message().map(String::from),
        }
    }

    /// Report for a file that never reached the pipeline (e.g. unreadable).
    pub fn failed(file_name: impl Into<String>, content_type: impl Into<String>, error: String) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            image_id: None,
            captions: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
