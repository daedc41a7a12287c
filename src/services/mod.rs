//! Services module - Pure business logic for the settings panel.
//!
//! The services are **framework-agnostic**: no storage, no UI, no runtime state.
//!
//! # Components
//!
//! - [`apply_toggle`]: the constraint engine. Given a [`SettingsDocument`](crate::models::SettingsDocument)
//!   and a checkbox toggle, returns a new document where at most one card farming option is
//!   enabled. Unchecking the only selected option leaves it selected.
//!
//! - [`SessionValidator`]: the port to the remote account service that turns a
//!   [`CredentialPair`](crate::models::CredentialPair) into a
//!   [`SessionIdentity`](crate::models::SessionIdentity) or a [`ValidationError`].
//!
//! # Usage Example
//!
//! ```ignore
//! use idler_settings::services::apply_toggle;
//!
//! let next = apply_toggle(&doc, "cardFarming", "allGames", true)?;
//! assert!(!next.card_farming_mode().is_enabled(CardFarmingOption::ListGames));
//! ```

pub mod constraint;
pub mod validator;

pub use constraint::{ConstraintError, apply_card_farming_toggle, apply_toggle};
pub use validator::{SessionValidator, ValidationError, ValidationResponse};
