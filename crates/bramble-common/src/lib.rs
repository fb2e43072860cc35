//! BrambleDB common types, errors, and configuration.
//!
//! This crate provides shared definitions used across all BrambleDB
//! components.

pub mod config;
pub mod error;

pub use config::TreeOptions;
pub use error::{BrambleError, Result};
