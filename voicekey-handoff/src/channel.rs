use crate::record::HandoffRecord;
use crate::store::HandoffStore;
use std::path::PathBuf;

/// The extension<->host result channel over the shared store.
///
/// Protocol: the extension calls `signal_awaiting` before emitting the
/// activation signal; the host calls `publish_result` on every session
/// completion; the extension calls `consume_if_ready` whenever it regains
/// visibility. Publishing deliberately leaves `awaiting_result` set; only
/// the consumer acknowledges, which gives at-least-once delivery until the
/// result is actually picked up.
#[derive(Debug, Clone)]
pub struct HandoffChannel {
    store: HandoffStore,
}

impl HandoffChannel {
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store: HandoffStore::at_path(path),
        }
    }

    pub fn store(&self) -> &HandoffStore {
        &self.store
    }

    /// Establishes the expectation that a result is forthcoming. Clears any
    /// leftover result text so a new activation can never consume a stale
    /// answer from an earlier exchange.
    pub fn signal_awaiting(&self) -> anyhow::Result<()> {
        let mut record = self.store.load();
        record.awaiting_result = true;
        record.result_text = None;
        self.store.save(&record)
    }

    /// Host side: records the session's textual outcome. Does not touch
    /// `awaiting_result`; acknowledgment belongs to the consumer.
    pub fn publish_result(&self, text: &str) -> anyhow::Result<()> {
        let mut record = self.store.load();
        record.result_text = Some(text.to_string());
        self.store.save(&record)
    }

    /// Extension side: returns the result and clears the awaiting flag, but
    /// only when a result is actually ready. Idempotent no-op otherwise, and
    /// never fails; a broken store just reads as "nothing ready yet".
    pub fn consume_if_ready(&self) -> Option<String> {
        let mut record = self.store.load();
        if !record.awaiting_result {
            return None;
        }
        let text = record.result_text.clone()?;

        record.awaiting_result = false;
        if let Err(e) = self.store.save(&record) {
            // Delivery stays at-least-once: the caller gets the text now and
            // may see it again if the acknowledgment never hits the disk.
            log::warn!("failed to acknowledge handoff result: {e:#}");
        }
        Some(text)
    }

    pub fn smart_mode(&self) -> bool {
        self.store.load().smart_mode
    }

    pub fn set_smart_mode(&self, on: bool) -> anyhow::Result<()> {
        let mut record = self.store.load();
        record.smart_mode = on;
        self.store.save(&record)
    }
}
