#![warn(missing_docs)]
//! mediagen - queue ComfyUI video workflows and generate music.
//!
//! Two independent clients live here:
//!
//! - [`ComfyClient`] submits workflow graphs to a ComfyUI server, polls the
//!   job history until the job is done, and reports the produced files.
//! - [`ElevenLabsMusicProvider`] turns a text prompt into an audio track in a
//!   single request.
//!
//! # Quick Start - Video
//!
//! ```no_run
//! use mediagen::{ComfyClient, TextToVideoRequest};
//!
//! #[tokio::main]
//! async fn main() -> mediagen::Result<()> {
//!     let client = ComfyClient::builder().build()?;
//!     let request = TextToVideoRequest::new("A paper boat drifting down a gutter")
//!         .with_duration(5);
//!     let job = client.generate(&request).await?;
//!     for video in job.videos() {
//!         println!("Video saved as: {}", video.filename);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Quick Start - Music
//!
//! ```no_run
//! use mediagen::{ElevenLabsMusicProvider, MusicGenerationRequest, MusicProvider};
//!
//! #[tokio::main]
//! async fn main() -> mediagen::Result<()> {
//!     let provider = ElevenLabsMusicProvider::builder().build()?;
//!     let request = MusicGenerationRequest::new("Warm lo-fi piano loop");
//!     let track = provider.generate(&request).await?;
//!     track.save("loop.mp3")?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `comfy-video`: ComfyUI workflow queue client
//! - `elevenlabs-music`: ElevenLabs text-to-music
//! - `video` / `audio`: all providers of that media type
//! - `cli`: the `comfy-gen` and `generate-music` binaries

mod error;

#[cfg(any(feature = "video", feature = "comfy-video"))]
pub mod video;

#[cfg(any(feature = "audio", feature = "elevenlabs-music"))]
pub mod audio;

// Re-export error types at crate root
pub use error::{GenError, Result};

#[cfg(any(feature = "video", feature = "comfy-video"))]
pub use video::{
    Artifact, CompletedJob, HistoryEntry, JobStatus, Node, TextToVideoRequest, Workflow,
};

#[cfg(feature = "comfy-video")]
pub use video::providers::{ComfyClient, ComfyClientBuilder};

#[cfg(any(feature = "audio", feature = "elevenlabs-music"))]
pub use audio::{
    AudioMetadata, AudioProviderKind, GeneratedAudio, MusicGenerationRequest, MusicProvider,
};

#[cfg(feature = "elevenlabs-music")]
pub use audio::providers::{ElevenLabsMusicProvider, ElevenLabsMusicProviderBuilder};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{GenError, Result};

    #[cfg(any(feature = "video", feature = "comfy-video"))]
    pub use crate::video::{Artifact, CompletedJob, TextToVideoRequest, Workflow};

    #[cfg(feature = "comfy-video")]
    pub use crate::video::providers::ComfyClient;

    #[cfg(any(feature = "audio", feature = "elevenlabs-music"))]
    pub use crate::audio::{GeneratedAudio, MusicGenerationRequest, MusicProvider};

    #[cfg(feature = "elevenlabs-music")]
    pub use crate::audio::providers::ElevenLabsMusicProvider;
}
