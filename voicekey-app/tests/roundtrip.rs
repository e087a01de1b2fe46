use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
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
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Grants permission and finishes with a canned artifact when stopped.
struct CannedMicrophone {
    sender: Mutex<Option<oneshot::Sender<CaptureFinished>>>,
}

impl CannedMicrophone {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sender: Mutex::new(None),
        })
    }
}

#[async_trait]
impl CaptureDevice for CannedMicrophone {
    async fn permission(&self) -> PermissionState {
        PermissionState::Granted
    }

    async fn request_permission(&self) -> bool {
        true
    }

    async fn start(&self) -> anyhow::Result<oneshot::Receiver<CaptureFinished>> {
        let (tx, rx) = oneshot::channel();
        *self.sender.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn stop(&self) -> anyhow::Result<()> {
        if let Some(tx) = self.sender.lock().unwrap().take() {
            let artifact = AudioArtifact::new(vec![0x5A; 128], AudioFormat::m4a_mono_12k());
            let _ = tx.send(CaptureFinished::success(artifact));
        }
        Ok(())
    }
}

/// Captures the activation URL the way the OS would hand it to the host.
struct RecordingLauncher {
    urls: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            urls: Mutex::new(vec![]),
        })
    }

    fn last_url(&self) -> String {
        self.urls.lock().unwrap().last().cloned().expect("no launch")
    }
}

#[async_trait]
impl HostLauncher for RecordingLauncher {
    async fn launch(&self, url: &str) -> anyhow::Result<()> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    channel: HandoffChannel,
    extension: ExtensionOrchestrator,
    host: HostOrchestrator,
    launcher: Arc<RecordingLauncher>,
}

fn fixture(base_url: &str, unlocked: bool) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let channel = HandoffChannel::at_path(dir.path().join("handoff.json"));

    let settings = SettingsStore::at_path(dir.path().join("settings.json"));
    settings
        .save(&HostSettings {
            has_seen_instructions: true,
            accepted_agreement: true,
        })
        .unwrap();

    let launcher = RecordingLauncher::new();
    let extension = ExtensionOrchestrator::new(channel.clone(), launcher.clone());

    let transcriber = Arc::new(RemoteTranscriber::new(RecognitionConfig {
        base_url: base_url.to_string(),
    }));
    let host = HostOrchestrator::new(
        settings,
        channel.clone(),
        CannedMicrophone::new(),
        transcriber,
        Arc::new(StaticEntitlement { unlocked }),
    );

    Fixture {
        _dir: dir,
        channel,
        extension,
        host,
        launcher,
    }
}

/// Polls the visibility hook until the published result lands, the way the
/// toolbar does on each reappearance.
async fn consume_eventually(extension: &ExtensionOrchestrator) -> Option<String> {
    for _ in 0..400 {
        if let Some(text) = extension.on_became_visible() {
            return Some(text);
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    None
}

#[tokio::test]
async fn full_round_trip_delivers_transcript_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recognise"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"transcript":"buy milk"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let fx = fixture(&server.uri(), true);

    fx.extension.start_dictation(true).await.unwrap();
    assert!(fx.channel.store().load().awaiting_result);
    assert!(fx.extension.smart_mode());

    let session = fx.host.on_activated(&fx.launcher.last_url()).await.unwrap();
    session.stop().await.unwrap();
    session.wait().await;

    assert_eq!(consume_eventually(&fx.extension).await.as_deref(), Some("buy milk"));
    // Consumed exactly once; the next visibility poll finds nothing.
    assert_eq!(fx.extension.on_became_visible(), None);
    assert!(!fx.channel.store().load().awaiting_result);

    // The wire request carried the smart-mode flag as text.
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"m4a_file\""));
    assert!(body.contains("name=\"smart_mode\"\r\n\r\ntrue"));
}

#[tokio::test]
async fn wait_publishes_before_it_returns() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recognise"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"transcript":"on the record"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let fx = fixture(&server.uri(), true);
    fx.extension.start_dictation(false).await.unwrap();

    let session = fx.host.on_activated(&fx.launcher.last_url()).await.unwrap();
    session.stop().await.unwrap();
    session.wait().await;

    // No polling: the moment wait returns, the store already holds the
    // result and the extension's next visibility check can consume it.
    let record = fx.channel.store().load();
    assert_eq!(record.result_text.as_deref(), Some("on the record"));
    assert!(record.awaiting_result);
    assert_eq!(
        fx.extension.on_became_visible().as_deref(),
        Some("on the record")
    );
}

#[tokio::test]
async fn edit_session_posts_prior_text_to_the_edit_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/edit"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"transcript":"buy milk and eggs"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let fx = fixture(&server.uri(), true);
    fx.extension.start_dictation(false).await.unwrap();

    let session = fx.host.run_edit("buy milk").await.unwrap();
    session.stop().await.unwrap();
    session.wait().await;

    assert_eq!(
        consume_eventually(&fx.extension).await.as_deref(),
        Some("buy milk and eggs")
    );

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"text\"\r\n\r\nbuy milk"));
    assert!(!body.contains("name=\"smart_mode\""));
}

#[tokio::test]
async fn missing_transcript_becomes_the_unknown_error_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/recognise"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{}"#, "application/json"))
        .mount(&server)
        .await;

    let fx = fixture(&server.uri(), true);
    fx.extension.start_dictation(false).await.unwrap();

    let session = fx.host.on_activated(&fx.launcher.last_url()).await.unwrap();
    session.stop().await.unwrap();
    session.wait().await;

    assert_eq!(
        consume_eventually(&fx.extension).await.as_deref(),
        Some("Unknown recognition error")
    );
}

#[tokio::test]
async fn transport_failure_publishes_a_readable_reason() {
    // Nothing listens here; the upload fails at the transport layer.
    let fx = fixture("http://127.0.0.1:9", true);
    fx.extension.start_dictation(false).await.unwrap();

    let session = fx.host.on_activated(&fx.launcher.last_url()).await.unwrap();
    session.stop().await.unwrap();
    let result = session.wait().await;
    assert!(result.is_failure());

    let text = consume_eventually(&fx.extension).await.expect("published");
    assert!(!text.is_empty());
}

#[tokio::test]
async fn cancellation_still_publishes_a_result() {
    let fx = fixture("http://127.0.0.1:9", true);
    fx.extension.start_dictation(false).await.unwrap();

    let session = fx.host.on_activated(&fx.launcher.last_url()).await.unwrap();
    session.cancel().await.unwrap();

    assert_eq!(
        consume_eventually(&fx.extension).await.as_deref(),
        Some("Recognition cancelled")
    );
}

#[tokio::test]
async fn locked_entitlement_refuses_but_unblocks_the_extension() {
    let fx = fixture("http://127.0.0.1:9", false);
    fx.extension.start_dictation(false).await.unwrap();

    let err = fx.host.on_activated(&fx.launcher.last_url()).await;
    assert!(err.is_err());

    let text = consume_eventually(&fx.extension).await.expect("published");
    assert!(text.contains("locked"));
}

#[tokio::test]
async fn incomplete_setup_refuses_with_guidance() {
    let dir = tempfile::tempdir().unwrap();
    let channel = HandoffChannel::at_path(dir.path().join("handoff.json"));
    let launcher = RecordingLauncher::new();
    let extension = ExtensionOrchestrator::new(channel.clone(), launcher.clone());

    // No settings file saved: fresh install, gates closed.
    let host = HostOrchestrator::new(
        SettingsStore::at_path(dir.path().join("settings.json")),
        channel,
        CannedMicrophone::new(),
        Arc::new(RemoteTranscriber::new(RecognitionConfig::default())),
        Arc::new(StaticEntitlement { unlocked: true }),
    );

    extension.start_dictation(false).await.unwrap();
    assert!(host.on_activated(&launcher.last_url()).await.is_err());

    let text = consume_eventually(&extension).await.expect("published");
    assert!(text.contains("setup"));
}
