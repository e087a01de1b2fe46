use serde::{Deserialize, Serialize};

/// Host-local flags that gate entry into dictation. Persisted by an explicit
/// settings store and injected into the host orchestrator; never read from
/// ambient global state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HostSettings {
    #[serde(default)]
    pub has_seen_instructions: bool,
    #[serde(default)]
    pub accepted_agreement: bool,
}

impl HostSettings {
    pub fn setup_complete(&self) -> bool {
        self.has_seen_instructions && self.accepted_agreement
    }
}
