//! Persisted list of active content-source ids.

use std::sync::Arc;

use crate::error::{GateError, Result};
use crate::models::SourceEntry;
use crate::storage::Storage;
use crate::verifier::Verifier;

pub const DEFAULT_SELECTION_KEY: &str = "selectedAPIs";

pub struct SelectionStore {
    storage: Arc<dyn Storage>,
    key: String,
}

impl SelectionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            key: DEFAULT_SELECTION_KEY.to_string(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    fn load(&self) -> Option<Vec<String>> {
        let raw = self.storage.get(&self.key)?;
        match serde_json::from_str(&raw) {
            Ok(ids) => Some(ids),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "ignoring malformed selection");
                None
            }
        }
    }

    /// True once a well-formed selection has been persisted.
    pub fn is_initialized(&self) -> bool {
        self.load().is_some()
    }

    pub fn selected(&self) -> Vec<String> {
        self.load().unwrap_or_default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected().iter().any(|s| s == id)
    }

    pub fn save(&self, ids: &[String]) -> Result<()> {
        let json = serde_json::to_string(ids).map_err(GateError::storage)?;
        self.storage.set(&self.key, &json)?;
        tracing::debug!(count = ids.len(), "selection saved");
        Ok(())
    }

    /// Flip `id` and persist. Returns whether it is selected afterwards.
    pub fn toggle(&self, id: &str) -> Result<bool> {
        let mut ids = self.selected();
        let now_selected = match ids.iter().position(|s| s == id) {
            Some(pos) => {
                ids.remove(pos);
                false
            }
            None => {
                ids.push(id.to_string());
                true
            }
        };
        self.save(&ids)?;
        Ok(now_selected)
    }

    /// Seed the selection with every non-adult source unless the user
    /// already has one. Returns whether anything was written.
    pub fn ensure_defaults(&self, catalog: &[SourceEntry]) -> Result<bool> {
        if self.is_initialized() {
            return Ok(false);
        }
        let defaults: Vec<String> = catalog
            .iter()
            .filter(|s| !s.adult)
            .map(|s| s.id.clone())
            .collect();
        self.save(&defaults)?;
        tracing::info!(count = defaults.len(), "default source selection applied");
        Ok(true)
    }

    /// Seed defaults whenever `verifier` reports a successful check.
    pub fn attach(self: &Arc<Self>, verifier: &Verifier, catalog: Vec<SourceEntry>) {
        let store = Arc::clone(self);
        verifier.on_verified(move |_| {
            if let Err(e) = store.ensure_defaults(&catalog) {
                tracing::warn!(error = %e, "could not seed default selection");
            }
        });
    }
}
