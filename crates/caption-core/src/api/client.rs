//! The backend API seam.
//!
//! One method per network step. Implementations only move bytes: they report
//! the status and leniently parsed body, and leave judging the response to
//! the orchestrator.

use super::body::ResponseBody;
use async_trait::async_trait;
use thiserror::Error;

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Parsed response body
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn new(status: u16, body: ResponseBody) -> Self {
        Self { status, body }
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A request that never produced a response (DNS, connect, TLS, I/O...).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Calls made by a pipeline run, in run order.
///
/// Uses `async_trait` because the pipeline holds an `Arc<dyn CaptionApi>`.
#[async_trait]
pub trait CaptionApi: Send + Sync {
    /// Step 1: request a presigned write URL and public read URL.
    async fn generate_presigned_url(
        &self,
        token: &str,
        content_type: &str,
    ) -> Result<ApiResponse, TransportError>;

    /// Step 2: PUT raw bytes to the presigned URL (no auth header).
    async fn upload(
        &self,
        presigned_url: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<ApiResponse, TransportError>;

    /// Step 3: register the uploaded image by its public URL.
    async fn register_image(
        &self,
        token: &str,
        image_url: &str,
    ) -> Result<ApiResponse, TransportError>;

    /// Step 4: generate captions for a registered image.
    async fn generate_captions(
        &self,
        token: &str,
        image_id: &str,
    ) -> Result<ApiResponse, TransportError>;
}
