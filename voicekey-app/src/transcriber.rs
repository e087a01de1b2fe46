use async_trait::async_trait;
use voicekey_core::messages;
use voicekey_core::types::AudioArtifact;
use voicekey_engine::traits::Transcriber;
use voicekey_providers::recognise::{RecognitionConfig, build_edit_request, build_recognise_request};
use voicekey_providers::request::HttpRequest;
use voicekey_providers::{parse, runtime};

/// The production transcriber: one multipart POST per call against the
/// recognition backend, no retries.
#[derive(Debug, Clone)]
pub struct RemoteTranscriber {
    cfg: RecognitionConfig,
}

impl RemoteTranscriber {
    pub fn new(cfg: RecognitionConfig) -> Self {
        Self { cfg }
    }

    async fn send(&self, req: HttpRequest) -> anyhow::Result<String> {
        let resp = runtime::execute(&req).await?;
        if !(200..=299).contains(&resp.status) {
            return Err(anyhow::anyhow!(
                "recognition failed: status={} body={}",
                resp.status,
                String::from_utf8_lossy(&resp.body)
            ));
        }

        // A 2xx answer with no transcript is the backend's "couldn't make
        // anything of it"; the user sees a fixed message, not an error.
        let transcript = parse::parse_recognition(&resp.body)?;
        Ok(transcript.unwrap_or_else(|| messages::UNKNOWN_RECOGNITION_ERROR.to_string()))
    }
}

#[async_trait]
impl Transcriber for RemoteTranscriber {
    async fn transcribe(
        &self,
        artifact: &AudioArtifact,
        smart_mode: bool,
    ) -> anyhow::Result<String> {
        self.send(build_recognise_request(&self.cfg, artifact, smart_mode))
            .await
    }

    async fn edit(&self, artifact: &AudioArtifact, prior_text: &str) -> anyhow::Result<String> {
        self.send(build_edit_request(&self.cfg, artifact, prior_text))
            .await
    }
}
