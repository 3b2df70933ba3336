//! Reference data for select boxes and labels.

use std::sync::Arc;

use grimoire_shared::LookupsResponse;

use crate::infrastructure::lookup_cache::LookupCache;
use crate::infrastructure::ports::{ClassRepo, RaceRepo, RepoError, SpellRepo};

pub struct LookupUseCases {
    cache: Arc<LookupCache>,
    classes: Arc<dyn ClassRepo>,
    races: Arc<dyn RaceRepo>,
    spells: Arc<dyn SpellRepo>,
}

impl LookupUseCases {
    pub fn new(
        cache: Arc<LookupCache>,
        classes: Arc<dyn ClassRepo>,
        races: Arc<dyn RaceRepo>,
        spells: Arc<dyn SpellRepo>,
    ) -> Self {
        Self {
            cache,
            classes,
            races,
            spells,
        }
    }

    /// Cached static lists plus live class, race and spell names.
    pub async fn all(&self) -> Result<LookupsResponse, RepoError> {
        self.cache.ensure_loaded().await?;
        let (classes, races, spells) = tokio::try_join!(
            self.classes.list_names(),
            self.races.list_names(),
            self.spells.list_names(),
        )?;
        Ok(LookupsResponse {
            lists: self.cache.snapshot(),
            classes,
            races,
            spells,
        })
    }

    /// Reload the static lists. Returns the number of entries loaded.
    pub async fn reload(&self) -> Result<usize, RepoError> {
        self.cache.reload().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClassRepo, MockLookupRepo, MockRaceRepo, MockSpellRepo};
    use grimoire_domain::{LookupEntry, LookupKind, NamedRef};

    fn names(name: &str) -> Vec<NamedRef> {
        vec![NamedRef {
            id: 1,
            name: name.into(),
        }]
    }

    #[tokio::test]
    async fn combines_cached_lists_with_live_names() {
        let mut lookups = MockLookupRepo::new();
        lookups.expect_load_all().times(1).returning(|| {
            Ok(vec![(
                LookupKind::Editions,
                LookupEntry {
                    id: 5,
                    name: "D&D 3.5E".into(),
                    abbreviation: Some("3.5E".into()),
                },
            )])
        });
        let mut classes = MockClassRepo::new();
        classes.expect_list_names().returning(|| Ok(names("Wizard")));
        let mut races = MockRaceRepo::new();
        races.expect_list_names().returning(|| Ok(names("Elf")));
        let mut spells = MockSpellRepo::new();
        spells.expect_list_names().returning(|| Ok(names("Sleep")));

        let use_case = LookupUseCases::new(
            Arc::new(LookupCache::new(Arc::new(lookups))),
            Arc::new(classes),
            Arc::new(races),
            Arc::new(spells),
        );
        let first = use_case.all().await.expect("lookups");
        let second = use_case.all().await.expect("lookups");

        assert_eq!(first.lists[&LookupKind::Editions][0].id, 5);
        assert_eq!(first.classes[0].name, "Wizard");
        assert_eq!(second.spells[0].name, "Sleep");
    }
}
