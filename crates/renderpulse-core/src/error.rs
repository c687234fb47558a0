//! Shared error type across RenderPulse crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PulseError {
    /// A metric name was registered twice. Fatal at startup.
    #[error("duplicate metric name: {0}")]
    DuplicateName(String),
    /// Rejected instrument input: negative counter increment, malformed
    /// label set, bad bucket layout. Registry state is left untouched.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}
