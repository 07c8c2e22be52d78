//! Error types for the password gate.
//!
//! A missing expected hash and a malformed verification record are not
//! errors: they degrade to "unprotected" and "unverified". Only the cases
//! below reach the caller.

/// Errors surfaced by the gate.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The digest could not be computed; the gate cannot make a decision.
    #[error("digest unavailable: {0}")]
    DigestUnavailable(String),

    /// The backing key-value store failed to persist a value.
    #[error("storage error: {0}")]
    Storage(String),

    /// The configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl GateError {
    #[inline]
    pub fn storage<E: std::fmt::Display>(err: E) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GateError>;
