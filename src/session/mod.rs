// Credential session module
//
// This module contains the SessionController, which owns the validation
// protocol for the stored session cookies:
// - activate: validate whatever is stored
// - submit: validate a new pair, store it only once accepted
// - clear: forget the pair

pub mod controller;

pub use controller::{SessionController, SessionError};
