//! Core types for video generation.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default model for the built-in text-to-video pipeline.
pub const DEFAULT_MODEL: &str = "wan2.5-t2v-preview";
/// Default output size label understood by the generator node.
pub const DEFAULT_SIZE: &str = "480p: 16:9 (832x480)";

/// A request to generate a video with the built-in two-node pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextToVideoRequest {
    /// The text prompt describing the desired video.
    pub prompt: String,
    /// Generator model identifier.
    pub model: String,
    /// Size label, e.g. "480p: 16:9 (832x480)".
    pub size: String,
    /// Video duration in seconds.
    pub duration_secs: u32,
    /// Seed for deterministic generation.
    pub seed: u64,
    /// Let the server rewrite the prompt before generating.
    pub prompt_extend: bool,
    /// Filename prefix for the saved video on the server.
    pub filename_prefix: String,
    /// Container format (e.g. "mp4").
    pub format: String,
    /// Video codec (e.g. "h264").
    pub codec: String,
}

impl TextToVideoRequest {
    /// Creates a new request with the given prompt and default settings.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: DEFAULT_MODEL.into(),
            size: DEFAULT_SIZE.into(),
            duration_secs: 5,
            seed: 42,
            prompt_extend: true,
            filename_prefix: "splash_gen".into(),
            format: "mp4".into(),
            codec: "h264".into(),
        }
    }

    /// Sets the generator model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the size label.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = size.into();
        self
    }

    /// Sets the desired video duration in seconds.
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = secs;
        self
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables server-side prompt extension.
    pub fn with_prompt_extend(mut self, extend: bool) -> Self {
        self.prompt_extend = extend;
        self
    }

    /// Sets the filename prefix of the saved video.
    pub fn with_filename_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.filename_prefix = prefix.into();
        self
    }

    /// Sets the container format.
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Sets the codec.
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }
}

/// A file produced by a finished job, as described by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Id of the node that produced it.
    pub node_id: String,
    /// Output slot it was listed under (`videos`, `images`, ...).
    pub kind: String,
    /// File name on the server.
    pub filename: String,
    /// Subfolder within the server's folder, possibly empty.
    pub subfolder: String,
    /// Server folder type (`output`, `temp`, `input`).
    #[serde(rename = "type")]
    pub folder_type: String,
}

impl Artifact {
    /// Returns true for artifacts listed under the `videos` slot.
    pub fn is_video(&self) -> bool {
        self.kind == "videos"
    }

    /// Human-readable label for the slot, e.g. "Video" for `videos`.
    pub fn label(&self) -> String {
        let singular = match self.kind.as_str() {
            "videos" => "video",
            "images" => "image",
            "gifs" => "gif",
            "audio" => "audio",
            other => other.strip_suffix('s').unwrap_or(other),
        };
        let mut chars = singular.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => "Artifact".into(),
        }
    }

    /// Local path for this artifact inside `dir`, using only its file name.
    pub fn local_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        let name = Path::new(&self.filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "artifact".into());
        dir.as_ref().join(name)
    }

    /// Writes fetched artifact bytes under `dir`, returning the path.
    pub fn save(&self, data: &[u8], dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = self.local_path(dir);
        std::fs::write(&path, data)?;
        Ok(path)
    }
}

/// A finished job and the artifacts it produced.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedJob {
    /// Server-assigned job identifier.
    pub prompt_id: String,
    /// Artifacts found in the job's outputs, in server order.
    pub artifacts: Vec<Artifact>,
    /// Time from submission to completion in milliseconds.
    pub duration_ms: u64,
}

impl CompletedJob {
    /// Artifacts listed under the `videos` slot.
    pub fn videos(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.iter().filter(|a| a.is_video())
    }
}
