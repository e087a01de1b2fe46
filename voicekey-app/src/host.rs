use crate::settings::SettingsStore;
use async_trait::async_trait;
use std::sync::Arc;
use voicekey_core::types::{SessionId, SessionMode, SessionResult};
use voicekey_engine::machine::RecordingSession;
use voicekey_engine::session::{SessionError, SessionState};
use voicekey_engine::traits::{CaptureDevice, Transcriber};
use voicekey_handoff::{ActivationSignal, HandoffChannel};

/// The purchase-management collaborator, reduced to the one signal the core
/// consumes: unlocked or not. `refresh` is the restore check poked as a side
/// effect of entering the gated flow.
#[async_trait]
pub trait EntitlementGate: Send + Sync {
    async fn refresh(&self);
    async fn is_unlocked(&self) -> bool;
}

/// Fixed entitlement answer, for tests and the CLI driver.
#[derive(Debug, Clone, Copy)]
pub struct StaticEntitlement {
    pub unlocked: bool,
}

#[async_trait]
impl EntitlementGate for StaticEntitlement {
    async fn refresh(&self) {}

    async fn is_unlocked(&self) -> bool {
        self.unlocked
    }
}

/// A running session paired with the channel its result is due on.
/// `wait` publishes before it returns, so a caller that has seen the result
/// knows the extension can already pick it up; a background task covers
/// sessions the caller drops without waiting.
pub struct HostSession {
    session: Arc<RecordingSession>,
    channel: HandoffChannel,
}

impl HostSession {
    pub fn id(&self) -> SessionId {
        self.session.id()
    }

    pub async fn state(&self) -> SessionState {
        self.session.state().await
    }

    pub async fn stop(&self) -> Result<(), SessionError> {
        self.session.stop().await
    }

    pub async fn cancel(&self) -> Result<(), SessionError> {
        self.session.cancel().await
    }

    /// Waits for the terminal result and publishes it into the channel.
    /// Publishing twice writes the same text, and a consumed record stays
    /// consumed, so racing the background publisher is harmless.
    pub async fn wait(&self) -> SessionResult {
        let result = self.session.wait().await;
        if let Err(e) = self.channel.publish_result(result.as_text()) {
            log::warn!("failed to publish session result: {e:#}");
        }
        result
    }
}

/// Host-process entry point: turns an activation signal into a running
/// session and guarantees that every session completion, whether done,
/// failed or canceled, lands in the handoff channel, so the extension is
/// never left waiting for a signal that will not arrive.
pub struct HostOrchestrator {
    settings: SettingsStore,
    channel: HandoffChannel,
    device: Arc<dyn CaptureDevice>,
    transcriber: Arc<dyn Transcriber>,
    gate: Arc<dyn EntitlementGate>,
}

impl HostOrchestrator {
    pub fn new(
        settings: SettingsStore,
        channel: HandoffChannel,
        device: Arc<dyn CaptureDevice>,
        transcriber: Arc<dyn Transcriber>,
        gate: Arc<dyn EntitlementGate>,
    ) -> Self {
        Self {
            settings,
            channel,
            device,
            transcriber,
            gate,
        }
    }

    /// Handles the URL the extension launched us with. On success the
    /// returned session is already recording; the UI drives `stop`/`cancel`
    /// on it, and the terminal result is published automatically.
    pub async fn on_activated(&self, raw_url: &str) -> anyhow::Result<HostSession> {
        let signal = match ActivationSignal::parse(raw_url) {
            Ok(signal) => signal,
            Err(e) => {
                // The extension already set its awaiting flag; unblock it.
                self.refuse(&format!("Dictation request not understood: {e}"))?;
                return Err(e.into());
            }
        };

        log::info!("activated with smart_mode={}", signal.smart_mode);
        self.begin(SessionMode::Transcribe, signal.smart_mode).await
    }

    /// Voice-driven revision of an existing transcript (the app's Edit
    /// button). Published exactly like a fresh dictation.
    pub async fn run_edit(&self, prior_text: &str) -> anyhow::Result<HostSession> {
        let smart_mode = self.channel.smart_mode();
        self.begin(
            SessionMode::Edit {
                prior_text: prior_text.to_string(),
            },
            smart_mode,
        )
        .await
    }

    async fn begin(&self, mode: SessionMode, smart_mode: bool) -> anyhow::Result<HostSession> {
        self.gate.refresh().await;
        if let Some(reason) = self.entry_refusal().await {
            self.refuse(&reason)?;
            return Err(anyhow::anyhow!(reason));
        }

        let session = RecordingSession::new(
            mode,
            smart_mode,
            Arc::clone(&self.device),
            Arc::clone(&self.transcriber),
        )?;
        session.start().await?;

        // Fallback publisher for a session the caller abandons; callers that
        // stay get the stronger guarantee from `HostSession::wait`.
        let channel = self.channel.clone();
        let waiter = Arc::clone(&session);
        tokio::spawn(async move {
            let result = waiter.wait().await;
            if let Err(e) = channel.publish_result(result.as_text()) {
                log::warn!("failed to publish session result: {e:#}");
            }
        });

        Ok(HostSession {
            session,
            channel: self.channel.clone(),
        })
    }

    async fn entry_refusal(&self) -> Option<String> {
        let settings = self.settings.load().unwrap_or_default();
        if !settings.setup_complete() {
            return Some("Finish setup in the VoiceKey app before dictating".into());
        }
        if !self.gate.is_unlocked().await {
            return Some("VoiceKey is locked. Restore your purchase in the app".into());
        }
        None
    }

    fn refuse(&self, reason: &str) -> anyhow::Result<()> {
        log::warn!("refusing dictation: {reason}");
        self.channel.publish_result(reason)
    }
}
