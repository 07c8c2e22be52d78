use std::sync::Arc;

use crate::config::GateConfig;
use crate::error::Result;
use crate::models::SourceEntry;
use crate::selection::SelectionStore;
use crate::storage::{FileStorage, Storage};
use crate::verifier::Verifier;

/// Verifier and selection store sharing one storage. The default selection
/// is seeded on construction when the gate is already open, otherwise on
/// the first successful verification.
#[derive(Clone)]
pub struct Gate {
    pub verifier: Arc<Verifier>,
    pub selection: Arc<SelectionStore>,
    pub sources: Vec<SourceEntry>,
}

impl Gate {
    pub fn new(config: &GateConfig, storage: Arc<dyn Storage>) -> Result<Self> {
        let verifier = Arc::new(Verifier::from_config(config, storage.clone())?);
        let selection = Arc::new(
            SelectionStore::new(storage).with_key(config.storage.selection_key.clone()),
        );
        selection.attach(&verifier, config.sources.clone());
        // already open: nothing will fire passwordVerified, so seed now
        if verifier.is_unlocked() {
            selection.ensure_defaults(&config.sources)?;
        }
        Ok(Self {
            verifier,
            selection,
            sources: config.sources.clone(),
        })
    }

    /// Open the gate over the file storage named in `config`.
    pub fn open(config: &GateConfig) -> Result<Self> {
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(&config.storage.path));
        Self::new(config, storage)
    }

    /// Sources currently selected, in catalog order. Ids unknown to the
    /// catalog are skipped.
    pub fn active_sources(&self) -> Vec<&SourceEntry> {
        let selected = self.selection.selected();
        self.sources
            .iter()
            .filter(|s| selected.iter().any(|id| *id == s.id))
            .collect()
    }
}
