pub mod extension;
pub mod host;
pub mod settings;
pub mod transcriber;

pub use extension::{ExtensionOrchestrator, HostLauncher};
pub use host::{EntitlementGate, HostOrchestrator, HostSession, StaticEntitlement};
pub use settings::SettingsStore;
pub use transcriber::RemoteTranscriber;
