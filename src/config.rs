//! Configuration management

use crate::error::{GateError, Result};
use crate::models::{Algorithm, SourceEntry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that overrides `password_hash`.
pub const PASSWORD_HASH_ENV: &str = "PASSGATE_PASSWORD_HASH";

/// 90 days.
pub const DEFAULT_VERIFICATION_TTL_MS: u64 = 90 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Expected hex digest of the password. `None` means no gate.
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    #[serde(default = "default_ttl")]
    pub verification_ttl_ms: u64,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub verification_key: String,
    pub selection_key: String,
}

fn default_algorithm() -> String {
    Algorithm::default().config_name().to_string()
}

fn default_ttl() -> u64 {
    DEFAULT_VERIFICATION_TTL_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("passgate-storage.json"),
            verification_key: "passwordVerification".to_string(),
            selection_key: "selectedAPIs".to_string(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            password_hash: None,
            algorithm: default_algorithm(),
            verification_ttl_ms: DEFAULT_VERIFICATION_TTL_MS,
            storage: StorageConfig::default(),
            sources: Vec::new(),
        }
    }
}

impl GateConfig {
    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GateError::Config(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&content).map_err(|e| GateError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load from `path` if it exists, otherwise start from defaults. The
    /// password hash environment override is applied either way.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            Self::load(path)?
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };
        config.apply_env_override(std::env::var(PASSWORD_HASH_ENV).ok());
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| GateError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| GateError::Config(e.to_string()))?;
        Ok(())
    }

    fn apply_env_override(&mut self, value: Option<String>) {
        if let Some(hash) = value {
            tracing::debug!("password hash taken from {}", PASSWORD_HASH_ENV);
            self.password_hash = Some(hash);
        }
    }

    /// Parse the configured algorithm. An unsupported name means no digest
    /// can be computed, which is fatal for the gate.
    pub fn algorithm(&self) -> Result<Algorithm> {
        self.algorithm.parse()
    }

    pub fn verification_ttl(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.verification_ttl_ms).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_file_fills_defaults() {
        let config: GateConfig = serde_json::from_str(r#"{"password_hash":"abc"}"#).unwrap();
        assert_eq!(config.password_hash.as_deref(), Some("abc"));
        assert_eq!(config.algorithm().unwrap(), Algorithm::Sha256);
        assert_eq!(config.verification_ttl_ms, 7_776_000_000);
        assert_eq!(config.storage.verification_key, "passwordVerification");
        assert_eq!(config.storage.selection_key, "selectedAPIs");
        assert!(config.sources.is_empty());
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passgate.json");
        let mut config = GateConfig::default();
        config.sources.push(SourceEntry { id: "x".into(), name: "X".into(), adult: true });
        config.save(&path).unwrap();

        let loaded = GateConfig::load(&path).unwrap();
        assert_eq!(loaded.sources, config.sources);
        assert!(loaded.password_hash.is_none());
    }

    #[test]
    fn env_override_replaces_hash() {
        let mut config = GateConfig::default();
        config.apply_env_override(None);
        assert!(config.password_hash.is_none());
        config.apply_env_override(Some("feed".into()));
        assert_eq!(config.password_hash.as_deref(), Some("feed"));
    }

    #[test]
    fn broken_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("passgate.json");
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(GateConfig::load(&path), Err(GateError::Config(_))));
    }
}
