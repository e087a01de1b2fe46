use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use voicekey_app::{
    ExtensionOrchestrator, HostLauncher, HostOrchestrator, RemoteTranscriber, SettingsStore,
    StaticEntitlement,
};
use voicekey_core::settings::HostSettings;
use voicekey_core::types::{AudioArtifact, AudioFormat};
use voicekey_engine::traits::{CaptureDevice, CaptureFinished, PermissionState};
use voicekey_handoff::HandoffChannel;
use voicekey_providers::recognise::RecognitionConfig;

/// A capture device fed from a file instead of a microphone, so the whole
/// extension -> host -> backend -> extension loop can be exercised from a
/// shell. Set VOICEKEY_AUDIO_FILE to an .m4a recording; without it a tiny
/// placeholder payload is uploaded (useful against a mock backend).
struct FileCaptureDevice {
    bytes: Vec<u8>,
    sender: Mutex<Option<oneshot::Sender<CaptureFinished>>>,
}

impl FileCaptureDevice {
    fn new(bytes: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            bytes,
            sender: Mutex::new(None),
        })
    }
}

#[async_trait]
impl CaptureDevice for FileCaptureDevice {
    async fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn request_permission(&self) -> bool {
        true
    }

    async fn start(&self) -> anyhow::Result<oneshot::Receiver<CaptureFinished>> {
        let (tx, rx) = oneshot::channel();
        *self.sender.lock().expect("sender lock") = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if let Some(tx) = self.sender.lock().expect("sender lock").take() {
            let artifact = AudioArtifact::new(self.bytes.clone(), AudioFormat::m4a_mono_12k());
            let _ = tx.send(CaptureFinished::success(artifact));
        }
        Ok(())
    }
}

/// Stands in for the OS open-URL hop between the two processes.
struct LoopbackLauncher {
    urls: Mutex<Vec<String>>,
}

#[async_trait]
impl HostLauncher for LoopbackLauncher {
    async fn launch(&self, url: &str) -> anyhow::Result<()> {
        self.urls.lock().expect("url lock").push(url.to_string());
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Usage: voicekey-cli [activation-url]
    // Env: VOICEKEY_ENDPOINT, VOICEKEY_AUDIO_FILE, VOICEKEY_STATE_DIR

    let activation = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "voicekey://dictation?smartMode=false".into());
    let smart_mode = voicekey_handoff::ActivationSignal::parse(&activation)?.smart_mode;

    let base_url = std::env::var("VOICEKEY_ENDPOINT")
        .unwrap_or_else(|_| RecognitionConfig::default().base_url);

    let audio_bytes = match std::env::var("VOICEKEY_AUDIO_FILE") {
        Ok(path) => std::fs::read(&path)?,
        Err(_) => vec![0u8; 32],
    };

    let state_dir = std::env::var("VOICEKEY_STATE_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("voicekey"));

    // The driver plays the part of a fully set-up install.
    let settings = SettingsStore::at_path(state_dir.join("settings.json"));
    settings.save(&HostSettings {
        has_seen_instructions: true,
        accepted_agreement: true,
    })?;

    let channel = HandoffChannel::at_path(state_dir.join("handoff.json"));
    let launcher = Arc::new(LoopbackLauncher {
        urls: Mutex::new(vec![]),
    });
    let extension = ExtensionOrchestrator::new(channel.clone(), launcher.clone());

    let host = HostOrchestrator::new(
        settings,
        channel,
        FileCaptureDevice::new(audio_bytes),
        Arc::new(RemoteTranscriber::new(RecognitionConfig { base_url })),
        Arc::new(StaticEntitlement { unlocked: true }),
    );

    // Extension side: set the expectation and "open" the host.
    extension.start_dictation(smart_mode).await?;
    let url = launcher
        .urls
        .lock()
        .expect("url lock")
        .last()
        .cloned()
        .expect("launch recorded");
    println!("activation: {url}");

    // Host side: run the session to completion.
    let session = host.on_activated(&url).await?;
    session.stop().await?;
    let result = session.wait().await;
    println!("session: {}", if result.is_failure() { "failed" } else { "done" });

    // Extension side again: the visibility poll picks the result up.
    for _ in 0..200 {
        if let Some(text) = extension.on_became_visible() {
            println!("inserted: {text}");
            return Ok(());
        }
        tokio::time::sleep(std::time::Duration::from_millis(25)).await;
    }

    anyhow::bail!("no result was published")
}
