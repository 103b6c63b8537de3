use tracing::{debug, warn};

use super::backend::StorageBackend;
use crate::errors::CoreError;
use crate::models::portfolio::PortfolioEntry;

/// Name of the slot holding the serialized entry list.
pub const PORTFOLIO_SLOT: &str = "portfolio";

/// The single owner of the user's portfolio entries.
///
/// Keeps one authoritative in-memory copy and writes the whole list through
/// to the backend after every mutation. There is no rollback: if a write
/// fails, the in-memory change stays and the error is handed back so the
/// caller can tell the user.
pub struct PortfolioStore {
    backend: Box<dyn StorageBackend>,
    entries: Vec<PortfolioEntry>,
}

impl std::fmt::Debug for PortfolioStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioStore")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl PortfolioStore {
    /// Open a store on `backend` and load whatever it holds.
    pub fn open(backend: impl StorageBackend + 'static) -> Self {
        let mut store = Self {
            backend: Box::new(backend),
            entries: Vec::new(),
        };
        store.load();
        store
    }

    /// (Re)read the persisted list, replacing the in-memory copy.
    ///
    /// Never fails: a missing, unreadable or malformed slot all load as an
    /// empty portfolio.
    pub fn load(&mut self) -> &[PortfolioEntry] {
        self.entries = match self.read_slot() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "ignoring persisted portfolio");
                Vec::new()
            }
        };
        debug!(entries = self.entries.len(), "portfolio loaded");
        &self.entries
    }

    fn read_slot(&self) -> Result<Vec<PortfolioEntry>, CoreError> {
        match self.backend.read(PORTFOLIO_SLOT)? {
            None => Ok(Vec::new()),
            Some(payload) => serde_json::from_str(&payload)
                .map_err(|e| CoreError::PersistenceParse(e.to_string())),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[PortfolioEntry] {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&PortfolioEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add `entry` at the end and persist the whole list.
    /// Entries for the same coin are kept side by side, never merged.
    ///
    /// JSON has no encoding for NaN or infinity, so an entry carrying one is
    /// refused with `Serialization` and neither memory nor storage change.
    pub fn append(&mut self, entry: PortfolioEntry) -> Result<(), CoreError> {
        if !entry.quantity.is_finite() || !entry.buy_price.is_finite() {
            return Err(CoreError::Serialization(format!(
                "entry for {:?} has a non-finite quantity or buy price",
                entry.coin_id
            )));
        }
        debug!(coin_id = %entry.coin_id, "appending portfolio entry");
        self.entries.push(entry);
        self.persist()
    }

    /// Remove the entry at `index` and persist the rest.
    ///
    /// Out of range is a no-op: nothing is written and `Ok(None)` comes back.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<PortfolioEntry>, CoreError> {
        if index >= self.entries.len() {
            debug!(index, len = self.entries.len(), "remove index out of range");
            return Ok(None);
        }
        let removed = self.entries.remove(index);
        debug!(index, coin_id = %removed.coin_id, "removed portfolio entry");
        self.persist()?;
        Ok(Some(removed))
    }

    fn persist(&self) -> Result<(), CoreError> {
        let payload = serde_json::to_string(&self.entries)?;
        self.backend.write(PORTFOLIO_SLOT, &payload).inspect_err(|e| {
            warn!(error = %e, "portfolio not persisted; memory and storage diverge");
        })
    }
}
