//! In-memory copy of the static lookup tables.
//!
//! The lists change only when an operator edits the database, so they are
//! loaded in full on first use and served from memory afterwards. There is
//! no eviction: `reload()` swaps in a fresh snapshot.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use grimoire_domain::{LookupEntry, LookupKind};

use crate::infrastructure::ports::{LookupRepo, RepoError};

pub struct LookupCache {
    repo: Arc<dyn LookupRepo>,
    lists: DashMap<LookupKind, Vec<LookupEntry>>,
    loaded: AtomicBool,
}

impl LookupCache {
    pub fn new(repo: Arc<dyn LookupRepo>) -> Self {
        Self {
            repo,
            lists: DashMap::new(),
            loaded: AtomicBool::new(false),
        }
    }

    /// Load the lists unless a snapshot is already present.
    pub async fn ensure_loaded(&self) -> Result<(), RepoError> {
        if !self.loaded.load(Ordering::Acquire) {
            self.reload().await?;
        }
        Ok(())
    }

    /// Replace the snapshot with the current database contents.
    ///
    /// Returns the number of entries loaded.
    pub async fn reload(&self) -> Result<usize, RepoError> {
        let rows = self.repo.load_all().await?;
        let count = rows.len();

        let mut grouped: BTreeMap<LookupKind, Vec<LookupEntry>> = BTreeMap::new();
        for (kind, entry) in rows {
            grouped.entry(kind).or_default().push(entry);
        }
        for entries in grouped.values_mut() {
            entries.sort_by_key(|e| e.id);
        }

        self.lists.retain(|kind, _| grouped.contains_key(kind));
        for (kind, entries) in grouped {
            self.lists.insert(kind, entries);
        }
        self.loaded.store(true, Ordering::Release);

        tracing::info!(entries = count, "Loaded lookup tables");
        Ok(count)
    }

    /// Every list, ordered by kind. Kinds with no rows are present and empty.
    pub fn snapshot(&self) -> BTreeMap<LookupKind, Vec<LookupEntry>> {
        LookupKind::ALL
            .into_iter()
            .map(|kind| {
                let entries = self
                    .lists
                    .get(&kind)
                    .map(|entries| entries.value().clone())
                    .unwrap_or_default();
                (kind, entries)
            })
            .collect()
    }

    /// Display name of one entry.
    pub fn name_of(&self, kind: LookupKind, id: i64) -> Option<String> {
        self.lists.get(&kind).and_then(|entries| {
            entries
                .value()
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.name.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::MockLookupRepo;

    fn entry(id: i64, name: &str) -> LookupEntry {
        LookupEntry {
            id,
            name: name.into(),
            abbreviation: None,
        }
    }

    #[tokio::test]
    async fn loads_once_and_groups_by_kind() {
        let mut repo = MockLookupRepo::new();
        repo.expect_load_all().times(1).returning(|| {
            Ok(vec![
                (LookupKind::Schools, entry(5, "Evocation")),
                (LookupKind::Schools, entry(1, "Abjuration")),
                (LookupKind::Sizes, entry(5, "Medium")),
            ])
        });

        let cache = LookupCache::new(Arc::new(repo));
        cache.ensure_loaded().await.expect("load");
        cache.ensure_loaded().await.expect("cached");

        let snapshot = cache.snapshot();
        assert_eq!(snapshot[&LookupKind::Schools][0].name, "Abjuration");
        assert!(snapshot[&LookupKind::Editions].is_empty());
        assert_eq!(
            cache.name_of(LookupKind::Sizes, 5).as_deref(),
            Some("Medium")
        );
    }

    #[tokio::test]
    async fn reload_replaces_the_snapshot() {
        let mut repo = MockLookupRepo::new();
        let mut calls = 0;
        repo.expect_load_all().times(2).returning(move || {
            calls += 1;
            if calls == 1 {
                Ok(vec![(LookupKind::FeatTypes, entry(1, "General"))])
            } else {
                Ok(vec![(LookupKind::Sizes, entry(4, "Small"))])
            }
        });

        let cache = LookupCache::new(Arc::new(repo));
        cache.reload().await.expect("first");
        assert_eq!(cache.reload().await.expect("second"), 1);
        assert!(cache.name_of(LookupKind::FeatTypes, 1).is_none());
        assert_eq!(cache.name_of(LookupKind::Sizes, 4).as_deref(), Some("Small"));
    }
}
