//! ElevenLabs text-to-music provider.

use crate::audio::provider::MusicProvider;
use crate::audio::types::{AudioMetadata, AudioProviderKind, GeneratedAudio, MusicGenerationRequest};
use crate::error::{GenError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Instant;

const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";
const MUSIC_PATH: &str = "/v1/text-to-music";

/// Builder for `ElevenLabsMusicProvider`.
#[derive(Debug, Clone, Default)]
pub struct ElevenLabsMusicProviderBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model_id: Option<String>,
}

impl ElevenLabsMusicProviderBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to `ELEVENLABS_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API host. Falls back to `ELEVENLABS_BASE_URL`, then the
    /// public endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Requests a specific model. Omitted from the body when unset.
    pub fn model_id(mut self, model: impl Into<String>) -> Self {
        self.model_id = Some(model.into());
        self
    }

    /// Builds the provider, resolving the API key.
    pub fn build(self) -> Result<ElevenLabsMusicProvider> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("ELEVENLABS_API_KEY").ok())
            .ok_or_else(|| {
                GenError::Auth("ELEVENLABS_API_KEY not set and no API key provided".into())
            })?;

        let base_url = self
            .base_url
            .or_else(|| std::env::var("ELEVENLABS_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(ElevenLabsMusicProvider {
            client: reqwest::Client::new(),
            api_key,
            url: format!("{}{}", base_url.trim_end_matches('/'), MUSIC_PATH),
            model_id: self.model_id,
        })
    }
}

/// ElevenLabs music generation provider.
pub struct ElevenLabsMusicProvider {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model_id: Option<String>,
}

impl ElevenLabsMusicProvider {
    /// Creates a new `ElevenLabsMusicProviderBuilder`.
    pub fn builder() -> ElevenLabsMusicProviderBuilder {
        ElevenLabsMusicProviderBuilder::new()
    }

    /// Full endpoint URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl MusicProvider for ElevenLabsMusicProvider {
    async fn generate(&self, request: &MusicGenerationRequest) -> Result<GeneratedAudio> {
        let start = Instant::now();
        let body = ElevenLabsMusicRequest::from_request(request, self.model_id.as_deref());

        tracing::debug!(url = %self.url, "sending ElevenLabs music request");
        let response = self
            .client
            .post(&self.url)
            .header("xi-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Body is reported verbatim so callers can show the provider's diagnostic
            let text = response.text().await.unwrap_or_default();
            return Err(GenError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let mime_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let data = response.bytes().await?.to_vec();

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(bytes = data.len(), duration_ms, "ElevenLabs music generation complete");

        Ok(GeneratedAudio::new(
            data,
            mime_type,
            AudioProviderKind::ElevenLabs,
            AudioMetadata {
                model: self.model_id.clone(),
                duration_ms: Some(duration_ms),
                music_length_ms: request.music_length_ms,
            },
        ))
    }

    fn kind(&self) -> AudioProviderKind {
        AudioProviderKind::ElevenLabs
    }

    async fn health_check(&self) -> Result<()> {
        if self.api_key.is_empty() {
            Err(GenError::Auth("API key is empty".into()))
        } else {
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ElevenLabsMusicRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    music_length_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_id: Option<&'a str>,
}

impl<'a> ElevenLabsMusicRequest<'a> {
    fn from_request(req: &'a MusicGenerationRequest, model_id: Option<&'a str>) -> Self {
        Self {
            text: &req.prompt,
            music_length_ms: req.music_length_ms,
            model_id,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_with_explicit_key() {
        let provider = ElevenLabsMusicProviderBuilder::new()
            .api_key("xi-test-key")
            .base_url("https://api.elevenlabs.io/")
            .build()
            .unwrap();
        assert_eq!(provider.url(), "https://api.elevenlabs.io/v1/text-to-music");
    }

    #[test]
    fn test_builder_missing_key() {
        let saved = std::env::var("ELEVENLABS_API_KEY").ok();
        std::env::remove_var("ELEVENLABS_API_KEY");

        let result = ElevenLabsMusicProviderBuilder::new().build();
        assert!(result.is_err());
        let err = result.err().unwrap();
        assert!(
            err.to_string().contains("ELEVENLABS_API_KEY"),
            "error should mention ELEVENLABS_API_KEY: {err}"
        );

        if let Some(val) = saved {
            std::env::set_var("ELEVENLABS_API_KEY", val);
        }
    }

    #[test]
    fn test_request_serialization_minimal() {
        let req = MusicGenerationRequest::new("Upbeat synthwave");
        let json = serde_json::to_value(ElevenLabsMusicRequest::from_request(&req, None)).unwrap();

        assert_eq!(json, serde_json::json!({"text": "Upbeat synthwave"}));
    }

    #[test]
    fn test_request_serialization_full() {
        let req = MusicGenerationRequest::new("Ambient drone").with_length_ms(45_000);
        let json = serde_json::to_value(ElevenLabsMusicRequest::from_request(
            &req,
            Some("music_v1"),
        ))
        .unwrap();

        assert_eq!(json["text"], "Ambient drone");
        assert_eq!(json["music_length_ms"], 45_000);
        assert_eq!(json["model_id"], "music_v1");
    }

    #[tokio::test]
    async fn test_health_check_empty_key() {
        let provider = ElevenLabsMusicProviderBuilder::new()
            .api_key("")
            .base_url(DEFAULT_BASE_URL)
            .build()
            .unwrap();
        let result = provider.health_check().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_health_check_with_key() {
        let provider = ElevenLabsMusicProviderBuilder::new()
            .api_key("xi-test-key")
            .build()
            .unwrap();
        assert!(provider.health_check().await.is_ok());
        assert_eq!(provider.name(), "ElevenLabs Music");
    }
}
