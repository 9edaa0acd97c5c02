// Submission boundary
//
// `SubmissionBoundary` is the seam between the wizard and whatever receives the final payload.
// Production uses `HttpSubmission` (POST /api/submit) or `SimulatedSubmission`; tests use stubs.
// Every call goes through `submit_with_deadline`, which bounds it with a timeout and a
// cancellation token so a hung endpoint cannot leave the wizard pending forever.

use crate::config::{SubmissionMode, SubmissionSettings};
use crate::models::payload::SubmissionPayload;
use crate::utils::logging::mask_payload;
use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use url::Url;

pub const SUBMIT_PATH: &str = "/api/submit";

/// Generic notice shown for every submission failure; entered data stays in place for a retry.
pub const SUBMIT_FAILED_MESSAGE: &str = "Pendaftaran Gagal. Silakan coba lagi.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("submission timed out after {0:?}")]
    TimedOut(Duration),
    #[error("submission cancelled")]
    Cancelled,
}

impl SubmitError {
    /// Message safe to show to the applicant.
    pub fn user_message(&self) -> &'static str {
        SUBMIT_FAILED_MESSAGE
    }
}

#[async_trait]
pub trait SubmissionBoundary: Send + Sync {
    /// Deliver the payload. Any acknowledgment counts as success.
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError>;

    fn timeout_duration(&self) -> Duration {
        Duration::from_secs(15)
    }
}

/// Run one submission bounded by the boundary's timeout and `cancel`.
pub async fn submit_with_deadline<B>(
    boundary: &B,
    payload: &SubmissionPayload,
    cancel: &CancellationToken,
) -> Result<(), SubmitError>
where
    B: SubmissionBoundary + ?Sized,
{
    let limit = boundary.timeout_duration();
    tokio::select! {
        _ = cancel.cancelled() => {
            warn!("[PHASE: submit] [STEP: cancel] Submission cancelled by user");
            Err(SubmitError::Cancelled)
        }
        res = timeout(limit, boundary.submit(payload)) => match res {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(
                    "[PHASE: submit] [STEP: timeout] Submission did not complete within {:?}",
                    limit
                );
                Err(SubmitError::TimedOut(limit))
            }
        },
    }
}

/// POSTs the payload as JSON. The response status is not inspected: reaching the endpoint is the
/// acknowledgment, only transport-level failures are errors.
pub struct HttpSubmission {
    client: reqwest::Client,
    endpoint: Url,
    timeout: Duration,
}

impl HttpSubmission {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid submission base URL: {}", base_url))?;
        let endpoint = base
            .join(SUBMIT_PATH)
            .with_context(|| format!("Cannot build submit endpoint from {}", base_url))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionBoundary for HttpSubmission {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        info!(
            "[PHASE: submit] [STEP: http] POST {} payload={}",
            self.endpoint,
            mask_payload(payload)
        );
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        info!(
            "[PHASE: submit] [STEP: http] Endpoint answered HTTP {}",
            resp.status()
        );
        Ok(())
    }

    fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

/// Stand-in endpoint: waits `latency`, logs the (masked) payload and acknowledges.
pub struct SimulatedSubmission {
    latency: Duration,
    timeout: Duration,
}

impl SimulatedSubmission {
    pub fn new(latency: Duration, timeout: Duration) -> Self {
        Self { latency, timeout }
    }
}

#[async_trait]
impl SubmissionBoundary for SimulatedSubmission {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmitError> {
        tokio::time::sleep(self.latency).await;
        info!(
            "[PHASE: submit] [STEP: simulated] Simulated submission sent: {}",
            mask_payload(payload)
        );
        Ok(())
    }

    fn timeout_duration(&self) -> Duration {
        self.timeout
    }
}

pub fn build_boundary(settings: &SubmissionSettings) -> Result<Arc<dyn SubmissionBoundary>> {
    let limit = Duration::from_secs(settings.timeout_secs);
    match settings.mode {
        SubmissionMode::Http => {
            let http = HttpSubmission::new(&settings.base_url, limit)?;
            info!(
                "[PHASE: initialization] Submission boundary: HTTP {}",
                http.endpoint()
            );
            Ok(Arc::new(http))
        }
        SubmissionMode::Simulated => {
            info!("[PHASE: initialization] Submission boundary: simulated");
            Ok(Arc::new(SimulatedSubmission::new(
                Duration::from_millis(settings.simulated_latency_ms),
                limit,
            )))
        }
    }
}
