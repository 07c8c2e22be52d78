use crate::error::GateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    #[default]
    Sha256,
    Sha512,
    Sha3_256,
    Blake3,
}

impl Algorithm {
    pub fn all() -> Vec<Algorithm> {
        vec![Algorithm::Sha256, Algorithm::Sha512, Algorithm::Sha3_256, Algorithm::Blake3]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "SHA-256",
            Algorithm::Sha512 => "SHA-512",
            Algorithm::Sha3_256 => "SHA3-256",
            Algorithm::Blake3 => "BLAKE3",
        }
    }

    /// Identifier used in configuration files.
    pub fn config_name(&self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha512 => "sha512",
            Algorithm::Sha3_256 => "sha3-256",
            Algorithm::Blake3 => "blake3",
        }
    }

    /// Length of the hex-encoded digest.
    pub fn hex_len(&self) -> usize {
        match self {
            Algorithm::Sha512 => 128,
            Algorithm::Sha256 | Algorithm::Sha3_256 | Algorithm::Blake3 => 64,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = GateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], "");
        match normalized.as_str() {
            "sha256" => Ok(Algorithm::Sha256),
            "sha512" => Ok(Algorithm::Sha512),
            "sha3256" => Ok(Algorithm::Sha3_256),
            "blake3" => Ok(Algorithm::Blake3),
            _ => Err(GateError::DigestUnavailable(format!("unsupported algorithm '{}'", s.trim()))),
        }
    }
}

/// Persisted outcome of the last successful password check.
///
/// Serialized as `{"verified": true, "timestamp": <epoch ms>, "passwordHash": "<hex>"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    pub verified: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub password_hash: String,
}

impl VerificationRecord {
    pub fn new(password_hash: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            verified: true,
            timestamp,
            password_hash: password_hash.into(),
        }
    }
}

/// Why a stored record is not trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnverifiedReason {
    Missing,
    Malformed,
    NotVerified,
    HashMismatch,
    Expired,
}

impl UnverifiedReason {
    pub fn describe(&self) -> &'static str {
        match self {
            UnverifiedReason::Missing => "no verification on record",
            UnverifiedReason::Malformed => "stored verification is unreadable",
            UnverifiedReason::NotVerified => "stored verification is not marked verified",
            UnverifiedReason::HashMismatch => "password has changed since last verification",
            UnverifiedReason::Expired => "verification has expired",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateStatus {
    /// No expected hash configured; nothing to unlock.
    Unprotected,
    Verified { expires_at: DateTime<Utc> },
    Unverified(UnverifiedReason),
}

impl GateStatus {
    pub fn is_unlocked(&self) -> bool {
        !matches!(self, GateStatus::Unverified(_))
    }
}

/// Payload of the `passwordVerified` notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PasswordVerified {
    pub verified_at: DateTime<Utc>,
}

/// One entry of the source catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub adult: bool,
}
