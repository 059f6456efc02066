//! Music provider trait.

use crate::audio::types::{AudioProviderKind, GeneratedAudio, MusicGenerationRequest};
use crate::error::Result;
use async_trait::async_trait;

/// Trait for music generation providers.
#[async_trait]
pub trait MusicProvider: Send + Sync {
    /// Generates a track from the given request.
    async fn generate(&self, request: &MusicGenerationRequest) -> Result<GeneratedAudio>;

    /// Returns the kind of this provider.
    fn kind(&self) -> AudioProviderKind;

    /// Returns the name of this provider for display.
    fn name(&self) -> &str {
        match self.kind() {
            AudioProviderKind::ElevenLabs => "ElevenLabs Music",
        }
    }

    /// Checks that the provider is configured well enough to send requests.
    async fn health_check(&self) -> Result<()>;
}
