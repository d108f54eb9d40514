//! Custom error types for the application.
//!
//! This module defines the primary error type, `PolscanError`, for the host program and the
//! configuration layer. Using the `thiserror` crate, it provides a centralized and consistent
//! way to handle the kinds of errors that can end the host loop, from configuration problems
//! to a broken operator channel.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: Wraps errors from `figment`, typically file parsing or type mismatches in
//!   the configuration sources.
//! - **`Configuration`**: Semantic errors in a configuration that parsed fine but is logically
//!   wrong (e.g., default scan start equal to default scan end).
//! - **`Io`**: Wraps `std::io::Error`.
//! - **`Transport`**: The line channel itself broke (the operator can no longer be reached).
//!
//! Operator-level problems (unknown commands, rejected scan parameters) and driver faults
//! (`anyhow` errors from the capability traits) are *not* errors at this level: they are
//! reported on the line channel and the read loop carries on.

use thiserror::Error;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, PolscanError>;

/// Application-level error.
#[derive(Error, Debug)]
pub enum PolscanError {
    /// Configuration sources could not be read or deserialized
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// Configuration parsed but is logically invalid
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// Reading from the operator channel failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing to the operator channel failed
    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<figment::Error> for PolscanError {
    fn from(value: figment::Error) -> Self {
        PolscanError::Config(Box::new(value))
    }
}
