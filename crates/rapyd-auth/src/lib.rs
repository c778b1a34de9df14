//! # rapyd-auth
//!
//! Optional HTTP Basic authentication guarding every file operation.

pub mod basic;
pub mod gate;

pub use basic::{AuthError, BasicCredentials, challenge_header, extract_basic_credentials};
pub use gate::{AuthGate, Identity};
