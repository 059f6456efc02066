//! Core types for music generation.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Music provider kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioProviderKind {
    ElevenLabs,
}

impl std::fmt::Display for AudioProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ElevenLabs => write!(f, "elevenlabs"),
        }
    }
}

/// Metadata about the generation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioMetadata {
    /// Model used for generation, if one was requested.
    pub model: Option<String>,
    /// Request duration in milliseconds.
    pub duration_ms: Option<u64>,
    /// Requested track length in milliseconds.
    pub music_length_ms: Option<u32>,
}

/// A request to generate a piece of music.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MusicGenerationRequest {
    /// Free-text description of the desired track.
    pub prompt: String,
    /// Desired track length in milliseconds; the provider picks when unset.
    pub music_length_ms: Option<u32>,
}

impl MusicGenerationRequest {
    /// Creates a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            music_length_ms: None,
        }
    }

    /// Sets the desired track length in milliseconds.
    pub fn with_length_ms(mut self, ms: u32) -> Self {
        self.music_length_ms = Some(ms);
        self
    }
}

/// Generated audio with its data and metadata.
#[derive(Debug, Clone)]
pub struct GeneratedAudio {
    /// Raw audio bytes, exactly as returned by the provider.
    pub data: Vec<u8>,
    /// MIME type (e.g., "audio/mpeg").
    pub mime_type: String,
    /// Provider that generated this track.
    pub provider: AudioProviderKind,
    /// Generation metadata.
    pub metadata: AudioMetadata,
}

impl GeneratedAudio {
    /// Creates a new generated track.
    pub fn new(
        data: Vec<u8>,
        mime_type: impl Into<String>,
        provider: AudioProviderKind,
        metadata: AudioMetadata,
    ) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            provider,
            metadata,
        }
    }

    /// Returns the size of the audio data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the audio to the specified path in a single write.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }
}
