//! Music generation module.

mod provider;
pub mod providers;
mod types;

pub use provider::MusicProvider;
pub use types::{AudioMetadata, AudioProviderKind, GeneratedAudio, MusicGenerationRequest};
