//! Pipeline API access.
//!
//! [`CaptionApi`] abstracts the four backend calls so the orchestrator can be
//! driven by the real HTTP client or by a test double.

pub mod body;
pub mod client;
pub mod http;
pub(crate) mod types;

pub use body::ResponseBody;
pub use client::{ApiResponse, CaptionApi, TransportError};
pub use http::{HttpCaptionApi, CAPTIONS_PATH, PRESIGN_PATH, REGISTER_PATH};
