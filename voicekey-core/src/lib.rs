pub mod messages;
pub mod settings;
pub mod types;

// Keep the public surface small and intentional.
pub use messages::*;
pub use settings::*;
pub use types::*;
