use async_trait::async_trait;
use std::sync::Arc;
use voicekey_handoff::{ActivationSignal, HandoffChannel};

/// How the sandboxed extension asks the platform to open the host process.
/// The extension has no other way to reach it.
#[async_trait]
pub trait HostLauncher: Send + Sync {
    async fn launch(&self, url: &str) -> anyhow::Result<()>;
}

/// Extension-process entry point. Fires the activation signal and, on each
/// return to visibility, polls the channel for a finished result. Nothing is
/// awaited synchronously; the extension's own event loop stays responsive.
pub struct ExtensionOrchestrator {
    channel: HandoffChannel,
    launcher: Arc<dyn HostLauncher>,
}

impl ExtensionOrchestrator {
    pub fn new(channel: HandoffChannel, launcher: Arc<dyn HostLauncher>) -> Self {
        Self { channel, launcher }
    }

    /// Kicks off a dictation in the host. The awaiting flag is durable
    /// before the launch, so the host's eventual publish always has a
    /// matching expectation to satisfy.
    pub async fn start_dictation(&self, smart_mode: bool) -> anyhow::Result<()> {
        self.channel.set_smart_mode(smart_mode)?;
        self.channel.signal_awaiting()?;

        let url = ActivationSignal::new(smart_mode).to_url();
        log::info!("launching host: {url}");
        self.launcher.launch(&url).await
    }

    /// The visibility poll: call whenever the toolbar reappears. Returns the
    /// text to insert into the focused field, at most once per dictation.
    pub fn on_became_visible(&self) -> Option<String> {
        self.channel.consume_if_ready()
    }

    /// Restores the smart-mode toggle after an extension relaunch.
    pub fn smart_mode(&self) -> bool {
        self.channel.smart_mode()
    }
}
