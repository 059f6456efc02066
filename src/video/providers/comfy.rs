//! ComfyUI workflow queue client.
//!
//! Submits API-format workflows to `POST /prompt`, polls
//! `GET /history/{prompt_id}` until the job shows up, and fetches the
//! produced files from `GET /view`.

use crate::error::{decode_json, GenError, Result};
use crate::video::history::HistoryEntry;
use crate::video::types::{Artifact, CompletedJob, TextToVideoRequest};
use crate::video::workflow::Workflow;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time;

/// Address of a ComfyUI server started with `--port 8000` on this machine.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Builder for `ComfyClient`.
#[derive(Debug, Clone)]
pub struct ComfyClientBuilder {
    base_url: Option<String>,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl Default for ComfyClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            poll_interval: Duration::from_secs(5),
            // Jobs sit in a shared queue; wait as long as it takes unless told otherwise
            timeout: None,
        }
    }
}

impl ComfyClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server address. Falls back to `COMFYUI_URL`, then
    /// [`DEFAULT_BASE_URL`].
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the pause between history polls.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the maximum time to wait for a job. Unset means no limit.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client, resolving the server address.
    pub fn build(self) -> Result<ComfyClient> {
        let base_url = self
            .base_url
            .or_else(|| std::env::var("COMFYUI_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = base_url.trim_end_matches('/').to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(GenError::InvalidRequest(format!(
                "server address must start with http:// or https://, got {base_url}"
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(GenError::InvalidRequest(
                "poll interval must be greater than zero".into(),
            ));
        }

        Ok(ComfyClient {
            client: reqwest::Client::new(),
            base_url,
            poll_interval: self.poll_interval,
            timeout: self.timeout,
        })
    }
}

/// Client for a ComfyUI server's queue and history endpoints.
#[derive(Debug, Clone)]
pub struct ComfyClient {
    client: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    timeout: Option<Duration>,
}

impl ComfyClient {
    /// Creates a new `ComfyClientBuilder`.
    pub fn builder() -> ComfyClientBuilder {
        ComfyClientBuilder::new()
    }

    /// Server address without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Queue a workflow, returning the server's `prompt_id`.
    pub async fn submit(&self, workflow: &Workflow) -> Result<String> {
        workflow.validate()?;

        let response = self
            .client
            .post(format!("{}/prompt", self.base_url))
            .json(&QueuePromptRequest { prompt: workflow })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(GenError::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let queued: QueuePromptResponse = decode_json(&body)?;
        let prompt_id = queued
            .prompt_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| GenError::MissingField("prompt_id".into()))?;

        tracing::debug!(
            prompt_id = %prompt_id,
            queue_number = ?queued.number,
            "queued ComfyUI workflow"
        );
        Ok(prompt_id)
    }

    /// Fetch the history record for a job, or `None` while it is pending.
    pub async fn history(&self, prompt_id: &str) -> Result<Option<HistoryEntry>> {
        let response = self
            .client
            .get(format!("{}/history/{}", self.base_url, prompt_id))
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(GenError::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let mut history: Map<String, Value> = decode_json(&body)?;
        match history.remove(prompt_id) {
            Some(entry) => serde_json::from_value(entry)
                .map(Some)
                .map_err(|e| GenError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    /// Poll until the job appears in the history.
    ///
    /// Waits without limit unless the client was built with a timeout.
    pub async fn poll_until_ready(&self, prompt_id: &str) -> Result<HistoryEntry> {
        self.poll_until_ready_or_cancelled(prompt_id, std::future::pending())
            .await
    }

    /// Poll until the job appears in the history or `cancel` resolves.
    ///
    /// Returns [`GenError::Cancelled`] if `cancel` finishes first. The server
    /// is not told; the job keeps running there.
    pub async fn poll_until_ready_or_cancelled<F>(
        &self,
        prompt_id: &str,
        cancel: F,
    ) -> Result<HistoryEntry>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let start = Instant::now();
        let deadline = self.timeout.map(|t| time::Instant::now() + t);
        let mut attempt: u32 = 0;

        loop {
            if deadline.is_some_and(|d| time::Instant::now() >= d) {
                return Err(self.timed_out());
            }

            attempt += 1;
            let entry = tokio::select! {
                _ = &mut cancel => return Err(GenError::Cancelled),
                entry = within(deadline, self.history(prompt_id)) => {
                    entry.ok_or_else(|| self.timed_out())??
                }
            };

            if let Some(entry) = entry {
                entry.check_status()?;
                tracing::debug!(prompt_id = %prompt_id, attempt, "ComfyUI job finished");
                return Ok(entry);
            }

            tracing::debug!(
                prompt_id = %prompt_id,
                attempt,
                elapsed_secs = start.elapsed().as_secs(),
                "polling ComfyUI history"
            );

            let wake = time::Instant::now() + self.poll_interval;
            let wake = deadline.map_or(wake, |d| wake.min(d));
            tokio::select! {
                _ = &mut cancel => return Err(GenError::Cancelled),
                _ = time::sleep_until(wake) => {}
            }
        }
    }

    fn timed_out(&self) -> GenError {
        GenError::Timeout(self.timeout.unwrap_or_default())
    }

    /// Download the bytes of a produced file.
    pub async fn fetch_artifact(&self, artifact: &Artifact) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(format!("{}/view", self.base_url))
            .query(&[
                ("filename", artifact.filename.as_str()),
                ("subfolder", artifact.subfolder.as_str()),
                ("type", artifact.folder_type.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let data = response.bytes().await?;
        if !status.is_success() {
            return Err(GenError::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&data).into_owned(),
            });
        }

        tracing::debug!(filename = %artifact.filename, bytes = data.len(), "fetched artifact");
        Ok(data.to_vec())
    }

    /// Queue a workflow and wait for its artifacts.
    pub async fn run(&self, workflow: &Workflow) -> Result<CompletedJob> {
        let start = Instant::now();

        let prompt_id = self.submit(workflow).await?;
        let entry = self.poll_until_ready(&prompt_id).await?;
        let artifacts = entry.artifacts()?;

        Ok(CompletedJob {
            prompt_id,
            artifacts,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Generate a video with the built-in text-to-video pipeline.
    pub async fn generate(&self, request: &TextToVideoRequest) -> Result<CompletedJob> {
        if request.prompt.trim().is_empty() {
            return Err(GenError::InvalidRequest("prompt must not be empty".into()));
        }
        self.run(&Workflow::text_to_video(request)).await
    }
}

/// Runs `fut` to completion, or returns `None` once `deadline` passes.
async fn within<T>(deadline: Option<time::Instant>, fut: impl Future<Output = T>) -> Option<T> {
    match deadline {
        Some(deadline) => time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

// ---------------------------------------------------------------------------
// Request / Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct QueuePromptRequest<'a> {
    prompt: &'a Workflow,
}

#[derive(Debug, Deserialize)]
struct QueuePromptResponse {
    #[serde(default)]
    prompt_id: Option<String>,
    #[serde(default)]
    number: Option<u64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = ComfyClientBuilder::new()
            .base_url("http://localhost:8188/")
            .build()
            .unwrap();
        assert_eq!(client.base_url, "http://localhost:8188");
        assert_eq!(client.poll_interval, Duration::from_secs(5));
        assert_eq!(client.timeout, None);
    }

    #[test]
    fn test_builder_custom_timeouts() {
        let client = ComfyClientBuilder::new()
            .base_url(DEFAULT_BASE_URL)
            .poll_interval(Duration::from_millis(250))
            .timeout(Duration::from_secs(900))
            .build()
            .unwrap();
        assert_eq!(client.poll_interval, Duration::from_millis(250));
        assert_eq!(client.timeout, Some(Duration::from_secs(900)));
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = ComfyClientBuilder::new()
            .base_url("127.0.0.1:8000")
            .build()
            .unwrap_err();
        assert!(matches!(err, GenError::InvalidRequest(_)));
    }

    #[test]
    fn test_builder_rejects_zero_interval() {
        let err = ComfyClientBuilder::new()
            .base_url(DEFAULT_BASE_URL)
            .poll_interval(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("poll interval"));
    }

    #[test]
    fn test_queue_request_serialization() {
        let workflow = Workflow::text_to_video(&TextToVideoRequest::new("A logo"));
        let json = serde_json::to_value(QueuePromptRequest { prompt: &workflow }).unwrap();
        assert_eq!(json["prompt"]["1"]["class_type"], "WanTextToVideoApi");
        assert_eq!(json["prompt"]["2"]["inputs"]["video"][0], "1");
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_queue_response_deserialization() {
        let json = r#"{"prompt_id": "5f0c-41", "number": 3, "node_errors": {}}"#;
        let resp: QueuePromptResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.prompt_id.as_deref(), Some("5f0c-41"));
        assert_eq!(resp.number, Some(3));

        let resp: QueuePromptResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.prompt_id.is_none());
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_workflow() {
        let client = ComfyClientBuilder::new()
            .base_url(DEFAULT_BASE_URL)
            .build()
            .unwrap();
        let err = client.submit(&Workflow::new()).await.unwrap_err();
        assert!(matches!(err, GenError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_generate_rejects_blank_prompt() {
        let client = ComfyClientBuilder::new()
            .base_url(DEFAULT_BASE_URL)
            .build()
            .unwrap();
        let err = client
            .generate(&TextToVideoRequest::new("   "))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("prompt"));
    }
}
