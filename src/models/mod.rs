//! Data models for the settings core.
//!
//! - [`SettingsDocument`]: the persisted settings, with card farming modelled as a [`CardFarmingMode`]
//! - [`CredentialPair`]: the two session cookies, stored together or not at all
//! - [`SessionStatus`] / [`SessionView`]: what the credential controller exposes to the UI
//! - [`AppConfig`]: data directory, logging and session timing configuration
//!
//! # Architecture Note
//!
//! Stored shapes stay compatible with the existing JSON documents (`settings`,
//! `steamCookies`); conversion to the typed models happens at the serde boundary.

pub mod config;
pub mod session;
pub mod settings;

pub use self::config::{AppConfig, LoggingConfig, SessionConfig};
pub use session::{CredentialPair, SessionIdentity, SessionStatus, SessionView};
pub use settings::{
    ACHIEVEMENT_UNLOCKER_AREA, CARD_FARMING_AREA, CardFarmingMode, CardFarmingOption,
    CardFarmingSettings, SettingsDocument,
};
