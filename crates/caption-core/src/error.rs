//! Error types for the caption pipeline.
//!
//! Pipeline errors are organized by step so every failure reduces to a single
//! message naming the step and the HTTP status (or the transport failure).

use std::fmt;
use thiserror::Error;

/// Top-level error type for caption operations.
#[derive(Error, Debug)]
pub enum CaptionError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline run errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Access token lookup errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by an access token provider.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The environment variable holding the token is not set
    #[error("Environment variable {0} is not set")]
    MissingEnvVar(String),

    /// The token file could not be read
    #[error("Failed to read token file {path}: {source}")]
    TokenFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A token was found but it is blank
    #[error("Access token is empty")]
    EmptyToken,
}

/// The four network steps of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Presign,
    Upload,
    Register,
    Caption,
}

impl Step {
    /// One-based position in the run sequence.
    pub fn number(self) -> u8 {
        match self {
            Step::Presign => 1,
            Step::Upload => 2,
            Step::Register => 3,
            Step::Caption => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Step::Presign => "presign",
            Step::Upload => "upload",
            Step::Register => "register",
            Step::Caption => "caption",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step {} ({})", self.number(), self.name())
    }
}

/// Pipeline run errors. All are terminal for the run that raised them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Declared content type is outside the allow-list
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    /// The auth collaborator did not yield a token
    #[error("No valid auth token found. Sign in again. ({0})")]
    NoSession(String),

    /// Presign request rejected or response missing URLs
    #[error("Step 1 (presign) failed: HTTP {status}: {detail}")]
    PresignFailed { status: u16, detail: String },

    /// Upload to the presigned URL rejected
    #[error("Step 2 (upload) failed: HTTP {status}: {detail}")]
    UploadFailed { status: u16, detail: String },

    /// Image registration rejected or response missing the image id
    #[error("Step 3 (register) failed: HTTP {status}: {detail}")]
    RegistrationFailed { status: u16, detail: String },

    /// Caption generation rejected
    #[error("Step 4 (caption) failed: HTTP {status}: {detail}")]
    CaptionFailed { status: u16, detail: String },

    /// The request never completed
    #[error("{step} failed: {message}")]
    Transport { step: Step, message: String },

    /// Another run is already in flight on this pipeline
    #[error("A pipeline run is already in progress")]
    Busy,
}

impl PipelineError {
    /// The network step this error belongs to, if any.
    pub fn step(&self) -> Option<Step> {
        match self {
            PipelineError::PresignFailed { .. } => Some(Step::Presign),
            PipelineError::UploadFailed { .. } => Some(Step::Upload),
            PipelineError::RegistrationFailed { .. } => Some(Step::Register),
            PipelineError::CaptionFailed { .. } => Some(Step::Caption),
            PipelineError::Transport { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            PipelineError::PresignFailed { status, .. }
            | PipelineError::UploadFailed { status, .. }
            | PipelineError::RegistrationFailed { status, .. }
            | PipelineError::CaptionFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Convenience type alias for caption results.
pub type Result<T> = std::result::Result<T, CaptionError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
