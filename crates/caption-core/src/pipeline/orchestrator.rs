//! The caption pipeline state machine.
//!
//! A run is four awaited calls in strict order: presign, upload, register,
//! caption. The first failure ends the run. Nothing is retried, and partial
//! progress (the registered image id) stays visible after a later failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::api::{ApiResponse, CaptionApi, TransportError};
use crate::auth::AccessTokenProvider;
use crate::captions::{normalize_captions, CaptionRecord};
use crate::error::{PipelineError, PipelineResult, Step};
use crate::upload::UploadCandidate;

use super::state::{RunSnapshot, RunState};

/// Write and read locations returned by the presign step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignedUpload {
    /// Presigned URL the bytes are PUT to
    pub write_url: String,
    /// Public URL the image is served from once uploaded
    pub read_url: String,
}

impl PresignedUpload {
    fn from_response(resp: &ApiResponse) -> PipelineResult<Self> {
        let fail = |detail: String| PipelineError::PresignFailed {
            status: resp.status,
            detail,
        };
        if !resp.is_success() {
            return Err(fail(resp.body.describe()));
        }
        let write_url = resp.body.str_field("presignedUrl");
        let read_url = resp.body.str_field("cdnUrl");
        match (write_url, read_url) {
            (Some(write_url), Some(read_url)) => Ok(Self {
                write_url: write_url.to_string(),
                read_url: read_url.to_string(),
            }),
            (None, Some(_)) => Err(fail("response missing presignedUrl".into())),
            (Some(_), None) => Err(fail("response missing cdnUrl".into())),
            (None, None) => Err(fail(format!(
                "response missing presignedUrl and cdnUrl: {}",
                resp.body.describe()
            ))),
        }
    }
}

fn image_id_from(resp: &ApiResponse) -> PipelineResult<String> {
    let fail = |detail: String| PipelineError::RegistrationFailed {
        status: resp.status,
        detail,
    };
    if !resp.is_success() {
        return Err(fail(resp.body.describe()));
    }
    match resp.body.json().and_then(|v| v.get("imageId")) {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(fail(format!(
            "response missing imageId: {}",
            resp.body.describe()
        ))),
    }
}

fn transport(step: Step) -> impl FnOnce(TransportError) -> PipelineError {
    move |e| PipelineError::Transport {
        step,
        message: e.0,
    }
}

/// Terminal message for a run whose future was dropped mid-flight.
pub const RUN_ABANDONED: &str = "Run abandoned before completion";

/// Held for the lifetime of a run. On drop it fails a still in-flight
/// snapshot, then releases the busy flag.
struct RunGuard<'a> {
    busy: &'a AtomicBool,
    state: &'a watch::Sender<RunSnapshot>,
}

impl<'a> RunGuard<'a> {
    fn acquire(busy: &'a AtomicBool, state: &'a watch::Sender<RunSnapshot>) -> Option<Self> {
        busy.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { busy, state })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let abandoned = self.state.send_if_modified(|snapshot| {
            if snapshot.state.is_in_flight() {
                snapshot.state = RunState::Failed(RUN_ABANDONED.to_string());
                true
            } else {
                false
            }
        });
        if abandoned {
            tracing::warn!("{RUN_ABANDONED}");
        }
        self.busy.store(false, Ordering::Release);
    }
}

/// Drives one upload-and-caption run at a time.
///
/// The current [`RunSnapshot`] is published through a watch channel, so a UI
/// can [`subscribe`](Self::subscribe) and render every transition while the
/// run is suspended on the network.
pub struct CaptionPipeline {
    api: Arc<dyn CaptionApi>,
    auth: Arc<dyn AccessTokenProvider>,
    busy: AtomicBool,
    state: watch::Sender<RunSnapshot>,
}

impl CaptionPipeline {
    pub fn new(api: Arc<dyn CaptionApi>, auth: Arc<dyn AccessTokenProvider>) -> Self {
        let (state, _) = watch::channel(RunSnapshot::default());
        Self {
            api,
            auth,
            busy: AtomicBool::new(false),
            state,
        }
    }

    /// Current state and image id.
    pub fn snapshot(&self) -> RunSnapshot {
        self.state.borrow().clone()
    }

    /// Receive every state change from now on.
    pub fn subscribe(&self) -> watch::Receiver<RunSnapshot> {
        self.state.subscribe()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Run the full pipeline for one image.
    ///
    /// Fails with [`PipelineError::Busy`] without touching the current
    /// snapshot if another run is in flight. Otherwise the snapshot is reset,
    /// driven through each step, and left at `Succeeded` or `Failed`. If the
    /// returned future is dropped early the snapshot ends at `Failed` with
    /// [`RUN_ABANDONED`].
    pub async fn run(&self, candidate: &UploadCandidate) -> PipelineResult<Vec<CaptionRecord>> {
        let Some(_guard) = RunGuard::acquire(&self.busy, &self.state) else {
            tracing::warn!(
                "Rejected {}: a pipeline run is already in progress",
                candidate.name
            );
            return Err(PipelineError::Busy);
        };

        self.state.send_replace(RunSnapshot::default());
        let result = self.execute(candidate).await;

        match &result {
            Ok(captions) => {
                tracing::info!("{}: {} caption(s) generated", candidate.name, captions.len());
                self.set_state(RunState::Succeeded(captions.clone()));
            }
            Err(e) => {
                tracing::warn!("{}: {e}", candidate.name);
                self.set_state(RunState::Failed(e.to_string()));
            }
        }
        result
    }

    async fn execute(&self, candidate: &UploadCandidate) -> PipelineResult<Vec<CaptionRecord>> {
        if !candidate.is_supported() {
            return Err(PipelineError::UnsupportedType(
                candidate.content_type.clone(),
            ));
        }

        // Step 1, which starts with the token lookup
        self.set_state(RunState::AwaitingPresign);
        let token = self
            .auth
            .access_token()
            .await
            .map_err(|e| PipelineError::NoSession(e.to_string()))?;
        tracing::debug!("{} ({}): requesting presigned URL", candidate.name, candidate.content_type);
        let resp = self
            .api
            .generate_presigned_url(&token, &candidate.content_type)
            .await
            .map_err(transport(Step::Presign))?;
        let presigned = PresignedUpload::from_response(&resp)?;

        // Step 2
        self.set_state(RunState::Uploading);
        tracing::debug!("{}: uploading {} bytes", candidate.name, candidate.size());
        let resp = self
            .api
            .upload(&presigned.write_url, &candidate.content_type, &candidate.bytes)
            .await
            .map_err(transport(Step::Upload))?;
        if !resp.is_success() {
            return Err(PipelineError::UploadFailed {
                status: resp.status,
                detail: resp.body.describe(),
            });
        }

        // Step 3
        self.set_state(RunState::RegisteringImage);
        tracing::debug!("{}: registering {}", candidate.name, presigned.read_url);
        let resp = self
            .api
            .register_image(&token, &presigned.read_url)
            .await
            .map_err(transport(Step::Register))?;
        let image_id = image_id_from(&resp)?;

        self.state.send_modify(|snapshot| {
            snapshot.image_id = Some(image_id.clone());
            snapshot.state = RunState::GeneratingCaptions;
        });

        // Step 4
        tracing::debug!("{}: generating captions for image {image_id}", candidate.name);
        let resp = self
            .api
            .generate_captions(&token, &image_id)
            .await
            .map_err(transport(Step::Caption))?;
        if !resp.is_success() {
            return Err(PipelineError::CaptionFailed {
                status: resp.status,
                detail: resp.body.describe(),
            });
        }

        Ok(normalize_captions(resp.body.json()))
    }

    fn set_state(&self, state: RunState) {
        self.state.send_modify(|snapshot| snapshot.state = state);
    }
}
