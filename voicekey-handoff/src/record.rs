use serde::{Deserialize, Serialize};

/// The durable payload shared between the extension and the host. Both
/// processes read and write it with no cross-process locking; the protocol
/// in [`crate::channel`] (set-before-signal, read-then-clear) is what keeps
/// it coherent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HandoffRecord {
    /// Set by the extension before it launches the host; cleared by the
    /// extension when it consumes a result.
    #[serde(default)]
    pub awaiting_result: bool,

    /// Written by the host on every session completion, success or not.
    #[serde(default)]
    pub result_text: Option<String>,

    /// Mirror of the extension's smart-mode toggle, so the toggle state
    /// survives extension relaunches.
    #[serde(default)]
    pub smart_mode: bool,
}
