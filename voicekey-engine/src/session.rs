use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    PermissionPending,
    Recording,
    Uploading,
    Done,
    Canceled,
    Failed,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Done | SessionState::Canceled | SessionState::Failed
        )
    }

    /// A stable string label for UI display.
    /// This is intentionally not derived from `Debug`.
    pub fn label(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::PermissionPending => "permission_pending",
            SessionState::Recording => "recording",
            SessionState::Uploading => "uploading",
            SessionState::Done => "done",
            SessionState::Canceled => "canceled",
            SessionState::Failed => "failed",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session already started (state: {})", .0.label())]
    AlreadyStarted(SessionState),
    #[error("session is not recording (state: {})", .0.label())]
    NotRecording(SessionState),
    #[error("session has not been started")]
    NotStarted,
    #[error("upload already in flight; cancellation is not supported here")]
    NotCancelable,
    #[error("edit mode requires non-empty prior text")]
    EmptyEditText,
}
