//! User-facing result strings. These travel across the process boundary as
//! plain text, so both sides must agree on them.

pub const RECOGNITION_CANCELLED: &str = "Recognition cancelled";
pub const PERMISSION_DENIED: &str = "Microphone permission denied";
pub const RECORDING_FAILED: &str = "Recording was unsuccessful";
pub const UNKNOWN_RECOGNITION_ERROR: &str = "Unknown recognition error";
