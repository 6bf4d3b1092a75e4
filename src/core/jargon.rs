//! Hot-swappable jargon (slang) dictionary.
//!
//! Recognition text is rewritten through a slang-to-canonical substitution
//! table before extraction, so domain shorthand ("红富士" for a product the
//! reference data knows under another name) resolves against the stores.
//! The table is refreshed wholesale: `reload` builds a fresh snapshot from
//! the jargon store and swaps it in atomically, so concurrent `translate`
//! calls see either the old or the new mapping, never a mix.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// One slang-to-canonical substitution pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JargonEntry {
    #[serde(default)]
    pub id: i64,
    pub slang_term: String,
    pub canonical_term: String,
}

/// Source of the full jargon entry set, queried on every reload.
#[async_trait]
pub trait JargonSource: Send + Sync {
    async fn list_entries(&self) -> anyhow::Result<Vec<JargonEntry>>;
}

type Snapshot = Arc<Vec<(String, String)>>;

/// Process-wide substitution table shared by all sessions.
pub struct JargonDictionary {
    source: Arc<dyn JargonSource>,
    mapping: RwLock<Snapshot>,
}

impl JargonDictionary {
    pub fn new(source: Arc<dyn JargonSource>) -> Self {
        Self {
            source,
            mapping: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Replace the whole mapping from the source.
    ///
    /// On failure the previous snapshot stays in service; the error is
    /// logged and never propagated to callers of the pipeline.
    pub async fn reload(&self) {
        match self.source.list_entries().await {
            Ok(entries) => {
                let snapshot: Snapshot = Arc::new(
                    entries
                        .into_iter()
                        .map(|e| (e.slang_term, e.canonical_term))
                        .collect(),
                );
                let count = snapshot.len();
                *self.mapping.write() = snapshot;
                info!("loaded {} jargon mappings", count);
            }
            Err(e) => {
                warn!("jargon reload failed, keeping previous mapping: {e:#}");
            }
        }
    }

    /// Replace every literal occurrence of each slang term with its
    /// canonical term.
    ///
    /// Replacement order is the snapshot's insertion order; it is not
    /// guaranteed stable across reloads if the backing store reorders.
    pub fn translate(&self, text: &str) -> String {
        let snapshot = Arc::clone(&self.mapping.read());
        let mut result = text.to_string();
        for (slang, canonical) in snapshot.iter() {
            if !slang.is_empty() {
                result = result.replace(slang, canonical);
            }
        }
        result
    }

    pub fn len(&self) -> usize {
        self.mapping.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.read().is_empty()
    }
}

/// In-memory jargon entry store with the CRUD surface the admin endpoints
/// need. Doubles as the dictionary's reload source.
#[derive(Default)]
pub struct InMemoryJargonStore {
    entries: RwLock<Vec<JargonEntry>>,
    next_id: RwLock<i64>,
}

impl InMemoryJargonStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            next_id: RwLock::new(1),
        }
    }

    pub fn create(&self, slang_term: String, canonical_term: String) -> JargonEntry {
        let mut next_id = self.next_id.write();
        let entry = JargonEntry {
            id: *next_id,
            slang_term,
            canonical_term,
        };
        *next_id += 1;
        self.entries.write().push(entry.clone());
        entry
    }

    /// Insert an entry with a caller-assigned id, used when seeding.
    pub fn insert(&self, entry: JargonEntry) {
        let mut next_id = self.next_id.write();
        if entry.id >= *next_id {
            *next_id = entry.id + 1;
        }
        self.entries.write().push(entry);
    }

    pub fn update(
        &self,
        id: i64,
        slang_term: String,
        canonical_term: String,
    ) -> Option<JargonEntry> {
        let mut entries = self.entries.write();
        let entry = entries.iter_mut().find(|e| e.id == id)?;
        entry.slang_term = slang_term;
        entry.canonical_term = canonical_term;
        Some(entry.clone())
    }

    pub fn delete(&self, id: i64) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        entries.len() != before
    }

    pub fn list(&self) -> Vec<JargonEntry> {
        self.entries.read().clone()
    }
}

#[async_trait]
impl JargonSource for InMemoryJargonStore {
    async fn list_entries(&self) -> anyhow::Result<Vec<JargonEntry>> {
        Ok(self.list())
    }
}
