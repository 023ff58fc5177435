//! Error types for relay_signal.
//!
//! Dispatch itself is total: `connect`, `disconnect`, and `emit` cannot
//! fail. The only fallible surface is construction-time configuration,
//! so the error enum stays narrow on purpose.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignalError>;

#[derive(Error, Debug)]
pub enum SignalError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SignalError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig { message: message.into() }
    }
}
