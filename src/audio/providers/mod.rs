//! Music generation providers.

#[cfg(feature = "elevenlabs-music")]
mod elevenlabs;

#[cfg(feature = "elevenlabs-music")]
pub use elevenlabs::{ElevenLabsMusicProvider, ElevenLabsMusicProviderBuilder};
