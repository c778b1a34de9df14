//! # rapyd-core
//!
//! Core crate for RapydShare. Contains configuration schemas, the unified
//! error system, the shared listing types and the thumbnail renderer trait.
//!
//! This crate has **no** internal dependencies on other RapydShare crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
