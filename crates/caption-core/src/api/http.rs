//! reqwest-backed implementation of [`CaptionApi`].

use super::body::ResponseBody;
use super::client::{ApiResponse, CaptionApi, TransportError};
use super::types::{GenerateCaptionsRequest, PresignRequest, RegisterImageRequest};
use async_trait::async_trait;
use serde::Serialize;

pub const PRESIGN_PATH: &str = "/pipeline/generate-presigned-url";
pub const REGISTER_PATH: &str = "/pipeline/upload-image-from-url";
pub const CAPTIONS_PATH: &str = "/pipeline/generate-captions";

/// HTTP client for the pipeline API.
///
/// No per-request timeout is set; the transport defaults apply.
pub struct HttpCaptionApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpCaptionApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create with a preconfigured client (proxies, custom TLS roots).
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        token: &str,
        body: &B,
    ) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("POST {url}");

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError(format!("request to {path} failed: {e}")))?;

        read_response(resp).await
    }
}

async fn read_response(resp: reqwest::Response) -> Result<ApiResponse, TransportError> {
    let status = resp.status().as_u16();
    let text = resp
        .text()
        .await
        .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
    Ok(ApiResponse::new(status, ResponseBody::parse(text)))
}

#[async_trait]
impl CaptionApi for HttpCaptionApi {
    async fn generate_presigned_url(
        &self,
        token: &str,
        content_type: &str,
    ) -> Result<ApiResponse, TransportError> {
        self.post_json(PRESIGN_PATH, token, &PresignRequest { content_type })
            .await
    }

    async fn upload(
        &self,
        presigned_url: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<ApiResponse, TransportError> {
        tracing::debug!("PUT {} bytes to presigned URL", bytes.len());

        let resp = self
            .client
            .put(presigned_url)
            .header("Content-Type", content_type)
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| TransportError(format!("upload request failed: {e}")))?;

        read_response(resp).await
    }

    async fn register_image(
        &self,
        token: &str,
        image_url: &str,
    ) -> Result<ApiResponse, TransportError> {
        let body = RegisterImageRequest {
            image_url,
            is_common_use: false,
        };
        self.post_json(REGISTER_PATH, token, &body).await
    }

    async fn generate_captions(
        &self,
        token: &str,
        image_id: &str,
    ) -> Result<ApiResponse, TransportError> {
        self.post_json(CAPTIONS_PATH, token, &GenerateCaptionsRequest { image_id })
            .await
    }
}
