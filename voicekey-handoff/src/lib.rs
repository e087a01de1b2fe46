pub mod channel;
pub mod record;
pub mod signal;
pub mod store;

pub use channel::HandoffChannel;
pub use record::HandoffRecord;
pub use signal::ActivationSignal;
pub use store::HandoffStore;
