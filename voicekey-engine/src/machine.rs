use crate::session::{SessionError, SessionState};
use crate::traits::{CaptureDevice, CaptureFinished, PermissionState, Transcriber};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, oneshot, watch};
use voicekey_core::messages;
use voicekey_core::types::{SessionId, SessionMode, SessionResult};

/// One recording attempt, end to end: permission negotiation, capture,
/// upload, result. Terminal states are terminal for the instance; a new
/// dictation needs a new session.
///
/// At most one session should be active per process. That is a caller
/// contract (UI-level gating), not something the machine re-checks.
pub struct RecordingSession {
    id: SessionId,
    mode: SessionMode,
    smart_mode: bool,
    device: Arc<dyn CaptureDevice>,
    transcriber: Arc<dyn Transcriber>,

    // Set in `cancel` under the state lock, before any async stop, so a
    // completion event racing with cancellation is observed as canceled.
    canceled: AtomicBool,

    state: Mutex<SessionState>,
    result_tx: watch::Sender<Option<SessionResult>>,
    result_rx: watch::Receiver<Option<SessionResult>>,
}

impl RecordingSession {
    pub fn new(
        mode: SessionMode,
        smart_mode: bool,
        device: Arc<dyn CaptureDevice>,
        transcriber: Arc<dyn Transcriber>,
    ) -> Result<Arc<Self>, SessionError> {
        if let SessionMode::Edit { prior_text } = &mode {
            if prior_text.trim().is_empty() {
                return Err(SessionError::EmptyEditText);
            }
        }

        let (result_tx, result_rx) = watch::channel(None);
        Ok(Arc::new(Self {
            id: SessionId::new(),
            mode,
            smart_mode,
            device,
            transcriber,
            canceled: AtomicBool::new(false),
            state: Mutex::new(SessionState::Idle),
            result_tx,
            result_rx,
        }))
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub async fn state(&self) -> SessionState {
        *self.state.lock().await
    }

    /// The terminal result, if one has been recorded yet.
    pub fn result(&self) -> Option<SessionResult> {
        self.result_rx.borrow().clone()
    }

    /// Waits for the terminal result. Safe to call from multiple waiters.
    pub async fn wait(&self) -> SessionResult {
        let mut rx = self.result_rx.clone();
        loop {
            {
                let current = rx.borrow_and_update();
                if let Some(result) = current.as_ref() {
                    return result.clone();
                }
            }
            if rx.changed().await.is_err() {
                // The session owns the sender, so this only happens if the
                // session is dropped mid-flight.
                return SessionResult::Failure(messages::RECORDING_FAILED.into());
            }
        }
    }

    /// Negotiates permission and starts capture. Permission denial and
    /// capture-start errors are terminal session outcomes, not `Err`s;
    /// `Err` here means the session was used out of order.
    pub async fn start(self: &Arc<Self>) -> Result<(), SessionError> {
        {
            let mut state = self.state.lock().await;
            if *state != SessionState::Idle {
                return Err(SessionError::AlreadyStarted(*state));
            }
            *state = SessionState::PermissionPending;
        }

        let granted = match self.device.permission().await {
            PermissionState::Granted => true,
            PermissionState::Denied => false,
            PermissionState::Undetermined => self.device.request_permission().await,
        };

        if self.canceled.load(Ordering::SeqCst) {
            self.finish(
                SessionState::Canceled,
                SessionResult::Failure(messages::RECOGNITION_CANCELLED.into()),
            )
            .await;
            return Ok(());
        }

        if !granted {
            log::warn!("session {}: microphone permission denied", self.id.0);
            self.finish(
                SessionState::Failed,
                SessionResult::Failure(messages::PERMISSION_DENIED.into()),
            )
            .await;
            return Ok(());
        }

        let finished = match self.device.start().await {
            Ok(rx) => rx,
            Err(e) => {
                log::warn!("session {}: capture start failed: {e:#}", self.id.0);
                self.finish(SessionState::Failed, SessionResult::Failure(e.to_string()))
                    .await;
                return Ok(());
            }
        };

        {
            let mut state = self.state.lock().await;
            if state.is_terminal() {
                // Canceled while the device was starting; release the mic.
                drop(state);
                let _ = self.device.stop().await;
                return Ok(());
            }
            *state = SessionState::Recording;
        }
        log::info!("session {}: recording", self.id.0);

        // The driver task consumes the single completion event, so a
        // device-driven finish takes the same path as a user stop.
        let session = Arc::clone(self);
        tokio::spawn(async move {
            session.drive(finished).await;
        });

        Ok(())
    }

    /// User stop: seals the capture. The completion event then carries the
    /// artifact into the upload.
    pub async fn stop(&self) -> Result<(), SessionError> {
        {
            let state = self.state.lock().await;
            if *state != SessionState::Recording {
                return Err(SessionError::NotRecording(*state));
            }
        }

        if let Err(e) = self.device.stop().await {
            log::warn!("session {}: capture stop failed: {e:#}", self.id.0);
            self.finish(SessionState::Failed, SessionResult::Failure(e.to_string()))
                .await;
        }
        Ok(())
    }

    /// Cooperative cancellation. Valid before the upload begins; once the
    /// machine is `Uploading` the request runs to completion and
    /// cancellation is rejected without effect. Canceling an already
    /// terminal session is a no-op.
    pub async fn cancel(&self) -> Result<(), SessionError> {
        {
            let state = self.state.lock().await;
            match *state {
                SessionState::Idle => return Err(SessionError::NotStarted),
                SessionState::Uploading => return Err(SessionError::NotCancelable),
                s if s.is_terminal() => return Ok(()),
                _ => {}
            }
            // Flag while the lock is still held; the driver re-checks it
            // under the same lock before entering Uploading, so cancellation
            // and upload entry cannot interleave.
            self.canceled.store(true, Ordering::SeqCst);
        }

        let _ = self.device.stop().await;

        self.finish(
            SessionState::Canceled,
            SessionResult::Failure(messages::RECOGNITION_CANCELLED.into()),
        )
        .await;
        Ok(())
    }

    async fn drive(self: Arc<Self>, finished: oneshot::Receiver<CaptureFinished>) {
        let event = finished.await;

        if self.canceled.load(Ordering::SeqCst) {
            // Late completion after cancel; the canceled result stands.
            self.finish(
                SessionState::Canceled,
                SessionResult::Failure(messages::RECOGNITION_CANCELLED.into()),
            )
            .await;
            return;
        }

        let artifact = match event {
            Ok(CaptureFinished {
                artifact: Some(artifact),
            }) => artifact,
            Ok(CaptureFinished { artifact: None }) | Err(_) => {
                self.finish(
                    SessionState::Failed,
                    SessionResult::Failure(messages::RECORDING_FAILED.into()),
                )
                .await;
                return;
            }
        };

        {
            let mut state = self.state.lock().await;
            if state.is_terminal() {
                return;
            }
            if self.canceled.load(Ordering::SeqCst) {
                // Cancellation won the race to the lock; never start the
                // upload.
                drop(state);
                self.finish(
                    SessionState::Canceled,
                    SessionResult::Failure(messages::RECOGNITION_CANCELLED.into()),
                )
                .await;
                return;
            }
            *state = SessionState::Uploading;
        }
        log::info!(
            "session {}: uploading {} bytes",
            self.id.0,
            artifact.bytes.len()
        );

        let outcome = match &self.mode {
            SessionMode::Transcribe => {
                self.transcriber
                    .transcribe(&artifact, self.smart_mode)
                    .await
            }
            SessionMode::Edit { prior_text } => self.transcriber.edit(&artifact, prior_text).await,
        };
        // `artifact` drops here; the audio never outlives the session.

        match outcome {
            Ok(text) => {
                self.finish(SessionState::Done, SessionResult::Text(text))
                    .await;
            }
            Err(e) => {
                self.finish(SessionState::Failed, SessionResult::Failure(e.to_string()))
                    .await;
            }
        }
    }

    /// Records the terminal result at most once; later calls are no-ops.
    /// State and result move together under the state lock.
    async fn finish(&self, terminal: SessionState, result: SessionResult) -> bool {
        let mut state = self.state.lock().await;
        let recorded = self.result_tx.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(result);
                true
            } else {
                false
            }
        });
        if recorded {
            *state = terminal;
            log::info!("session {}: {}", self.id.0, terminal.label());
        }
        recorded
    }
}
