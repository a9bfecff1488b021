//! Persistent raw identifier → canonical symbol cache.
//!
//! Entries are loaded once from a [`MappingStore`] and written through on every
//! change. There is no expiry; [`SymbolCache::clear`] is the only way to drop entries.
//! The backing store is a single shared document, so two processes writing at once
//! lose one update (last writer wins).

use crate::domain::error::SignalError;
use crate::domain::symbol_guess::normalize_identifier;
use crate::ports::mapping_store::MappingStore;
use std::collections::BTreeMap;
use tracing::warn;

pub struct SymbolCache {
    store: Box<dyn MappingStore>,
    entries: BTreeMap<String, String>,
}

impl SymbolCache {
    /// Loads the stored mapping. An unreadable store starts the cache empty.
    pub fn open(store: Box<dyn MappingStore>) -> Self {
        let entries = store.load().unwrap_or_else(|e| {
            warn!("symbol mapping unreadable, starting empty: {e}");
            BTreeMap::new()
        });
        Self { store, entries }
    }

    pub fn get(&self, raw: &str) -> Option<&str> {
        self.entries
            .get(&normalize_identifier(raw))
            .map(String::as_str)
    }

    /// Records a mapping and persists the whole document immediately. The entry
    /// stays in memory even when persisting fails.
    pub fn put(&mut self, raw: &str, symbol: &str) -> Result<(), SignalError> {
        let key = normalize_identifier(raw);
        if key.is_empty() {
            return Ok(());
        }
        self.entries.insert(key, normalize_identifier(symbol));
        self.store.save(&self.entries)
    }

    pub fn clear(&mut self) -> Result<(), SignalError> {
        self.entries.clear();
        self.store.save(&self.entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}
