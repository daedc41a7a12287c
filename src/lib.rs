// Idler Settings - card farming settings and credential session core
//
// This library crate owns the settings document, the mutual-exclusion rule
// for the card farming options, and the validation state machine for the
// stored session cookies. A UI layer drives it and observes its state.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod store;

// Re-export commonly used types for convenience
pub use self::config::ConfigManager;
pub use metrics::Metrics;
pub use models::{
    AppConfig, CardFarmingMode, CardFarmingOption, CredentialPair, SessionIdentity, SessionStatus,
    SessionView, SettingsDocument,
};
pub use services::{SessionValidator, ValidationError, apply_toggle};
pub use session::{SessionController, SessionError};
pub use state::{SettingsChange, SettingsIntent, SettingsSynchronizer};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
