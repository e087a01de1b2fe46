use async_trait::async_trait;
use tokio::sync::oneshot;
use voicekey_core::types::AudioArtifact;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Undetermined,
}

/// The one completion event a capture emits. `artifact` is `None` when the
/// device finished unsuccessfully.
#[derive(Debug)]
pub struct CaptureFinished {
    pub artifact: Option<AudioArtifact>,
}

impl CaptureFinished {
    pub fn success(artifact: AudioArtifact) -> Self {
        Self {
            artifact: Some(artifact),
        }
    }

    pub fn failure() -> Self {
        Self { artifact: None }
    }
}

/// The OS audio subsystem, reduced to what a session needs: permission
/// negotiation and a single active capture.
///
/// `start` hands back a receiver that fires exactly once per capture, after
/// either `stop` or a device-driven finish (e.g. the recording limit). The
/// device must deactivate cleanly on `stop` so a later session is never
/// blocked by a dangling capture.
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn permission(&self) -> PermissionState;

    /// Prompts the user; returns whether recording was granted.
    async fn request_permission(&self) -> bool;

    async fn start(&self) -> anyhow::Result<oneshot::Receiver<CaptureFinished>>;

    async fn stop(&self) -> anyhow::Result<()>;
}

/// The remote recognition backend. Both calls are single-attempt; transport
/// and protocol failures surface as errors with a human-readable description
/// and are never retried here.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, artifact: &AudioArtifact, smart_mode: bool)
    -> anyhow::Result<String>;

    async fn edit(&self, artifact: &AudioArtifact, prior_text: &str) -> anyhow::Result<String>;
}
