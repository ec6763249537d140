//! Caption Core - client library for the image captioning pipeline API.
//!
//! A run takes one local image through four backend calls:
//!
//! ```text
//! presign → PUT bytes → register image URL → generate captions
//! ```
//!
//! Authentication, storage and inference all live behind the API; this crate
//! owns sequencing, input validation, and surfacing results and errors.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use caption_core::{CaptionPipeline, Config, HttpCaptionApi, UploadCandidate};
//!
//! #[tokio::main]
//! async fn main() -> caption_core::Result<()> {
//!     let config = Config::load()?;
//!     let api = Arc::new(HttpCaptionApi::new(&config.api.base_url));
//!     let pipeline = CaptionPipeline::new(api, config.token_provider());
//!
//!     let image = UploadCandidate::from_path("./dog.jpg".as_ref(), None).await?;
//!     for caption in pipeline.run(&image).await? {
//!         println!("{}", caption.display_text());
//!     }
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod api;
pub mod auth;
pub mod captions;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod types;
pub mod upload;

// Re-exports for convenient access
pub use api::{ApiResponse, CaptionApi, HttpCaptionApi, ResponseBody, TransportError};
pub use auth::{AccessTokenProvider, EnvToken, StaticToken, TokenFile};
pub use captions::CaptionRecord;
pub use config::{Config, TokenSource};
pub use error::{AuthError, CaptionError, ConfigError, PipelineError, PipelineResult, Result, Step};
pub use output::{OutputFormat, ReportWriter};
pub use pipeline::{CaptionPipeline, RunSnapshot, RunState};
pub use types::{CaptionEntry, RunReport};
pub use upload::{UploadCandidate, SUPPORTED_CONTENT_TYPES};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
