use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioCodec {
    AacM4a,
}

impl AudioCodec {
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioCodec::AacM4a => "audio/mp4",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioCodec::AacM4a => "m4a",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate_hz: u32,
    pub channels: u16,
    pub codec: AudioCodec,
}

impl AudioFormat {
    /// The capture settings used for uploads: mono AAC at 12 kHz.
    pub fn m4a_mono_12k() -> Self {
        Self {
            sample_rate_hz: 12_000,
            channels: 1,
            codec: AudioCodec::AacM4a,
        }
    }
}

/// A sealed recording produced by a finished capture. Owned by exactly one
/// session and dropped when that session reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    pub id: ArtifactId,
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl AudioArtifact {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self {
            id: ArtifactId::new(),
            bytes,
            format,
        }
    }

    pub fn upload_file_name(&self) -> String {
        format!("{}.{}", self.id.0, self.format.codec.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionMode {
    Transcribe,
    Edit { prior_text: String },
}

/// The single outcome of a session. Cancellation and failure carry a short
/// human-readable reason; nothing richer ever crosses the process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionResult {
    Text(String),
    Failure(String),
}

impl SessionResult {
    pub fn as_text(&self) -> &str {
        match self {
            SessionResult::Text(t) => t,
            SessionResult::Failure(t) => t,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SessionResult::Failure(_))
    }
}
