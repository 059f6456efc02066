//! Video generation backends.

#[cfg(feature = "comfy-video")]
mod comfy;

#[cfg(feature = "comfy-video")]
pub use comfy::{ComfyClient, ComfyClientBuilder, DEFAULT_BASE_URL};
