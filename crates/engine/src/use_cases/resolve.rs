//! Batched resolution of entity references.
//!
//! Each kind is resolved with a single query no matter how many names are
//! asked for. Hits are cached for a short TTL; misses are not, so a newly
//! created entity links up on the next render. Renames and deletes drop the
//! cached hits of their kind.

use std::collections::HashMap;
use std::sync::Arc;

use grimoire_domain::{EntityKind, LinkTarget, Slug};
use grimoire_shared::{ResolveRequest, ResolveResponse, ResolvedEntity};

use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::ports::{EntityLookupRepo, ReferenceTableRepo, RepoError};
use crate::markdown::{ReferenceSet, Resolution, Resolutions};

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Unknown entity type: {0}")]
    UnknownType(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub type ResolutionCache = TtlCache<(EntityKind, String), Resolution>;

impl ResolutionCache {
    /// Drop every cached resolution of `kind`.
    pub async fn forget_kind(&self, kind: EntityKind) -> usize {
        let removed = self.remove_where(|(cached, _), _| *cached == kind).await;
        tracing::debug!(?kind, removed, "Dropped cached resolutions");
        removed
    }
}

pub struct ResolveEntities {
    entities: Arc<dyn EntityLookupRepo>,
    tables: Arc<dyn ReferenceTableRepo>,
    cache: Arc<ResolutionCache>,
}

impl ResolveEntities {
    pub fn new(
        entities: Arc<dyn EntityLookupRepo>,
        tables: Arc<dyn ReferenceTableRepo>,
        cache: Arc<ResolutionCache>,
    ) -> Self {
        Self {
            entities,
            tables,
            cache,
        }
    }

    /// Resolve `{type, name}` queries into the per-type response map.
    pub async fn execute(&self, request: &ResolveRequest) -> Result<ResolveResponse, ResolveError> {
        let mut refs = ReferenceSet::new();
        for query in &request.queries {
            let kind = query
                .kind
                .parse::<EntityKind>()
                .map_err(|_| ResolveError::UnknownType(query.kind.clone()))?;
            refs.insert(kind, query.name.trim().to_lowercase());
        }

        let resolutions = self.resolve(&refs).await?;

        let mut response = ResolveResponse::new();
        for (kind, keys) in refs.iter() {
            let entries = response.entry(kind.as_str().to_string()).or_default();
            for key in keys {
                let resolved = resolutions.get(kind, key).map(resolved_entity);
                entries.insert(key.clone(), resolved);
            }
        }
        Ok(response)
    }

    /// Resolve every key in `refs`: cache first, then one lookup per kind
    /// for whatever the cache didn't have.
    pub async fn resolve(&self, refs: &ReferenceSet) -> Result<Resolutions, ResolveError> {
        let mut resolutions = Resolutions::new();
        if refs.is_empty() {
            return Ok(resolutions);
        }

        let wanted: Vec<(EntityKind, String)> = refs
            .iter()
            .flat_map(|(kind, keys)| keys.iter().map(move |key| (kind, key.clone())))
            .collect();
        let cached = self.cache.get_many(wanted.iter()).await;

        let mut missing = ReferenceSet::new();
        for (kind, key) in wanted {
            match cached.get(&(kind, key.clone())) {
                Some(resolution) => resolutions.insert(kind, key, resolution.clone()),
                None => missing.insert(kind, key),
            }
        }

        let mut fresh = Vec::new();
        for (kind, keys) in missing.iter() {
            let keys: Vec<String> = keys.iter().cloned().collect();
            let found = if kind == EntityKind::ReferenceTable {
                self.find_tables(&keys).await?
            } else {
                self.find_links(kind, &keys).await?
            };
            tracing::debug!(
                kind = %kind,
                requested = keys.len(),
                resolved = found.len(),
                "Resolved reference batch"
            );
            fresh.extend(found.into_iter().map(|(key, resolution)| ((kind, key), resolution)));
        }

        for ((kind, key), resolution) in &fresh {
            resolutions.insert(*kind, key.clone(), resolution.clone());
        }
        self.cache.insert_many(fresh).await;
        Ok(resolutions)
    }

    /// Links for `keys`. When two entities share a name the lowest id wins.
    async fn find_links(
        &self,
        kind: EntityKind,
        keys: &[String],
    ) -> Result<Vec<(String, Resolution)>, RepoError> {
        let links = self.entities.find_links(kind, keys).await?;
        let mut found: HashMap<String, Resolution> = HashMap::new();
        for link in links {
            let key = match &link.id {
                LinkTarget::Slug(slug) if kind.is_slug_keyed() => slug.to_lowercase(),
                _ => link.name.trim().to_lowercase(),
            };
            if keys.contains(&key) {
                found.entry(key).or_insert(Resolution::Link(link));
            }
        }
        Ok(found.into_iter().collect())
    }

    /// Tables for `keys`. Keys that aren't valid slugs can't match anything.
    async fn find_tables(&self, keys: &[String]) -> Result<Vec<(String, Resolution)>, RepoError> {
        let slugs: Vec<Slug> = keys.iter().filter_map(|key| Slug::new(key.as_str()).ok()).collect();
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        let tables = self.tables.get_many(&slugs).await?;
        Ok(tables
            .into_iter()
            .map(|table| {
                let key = table.table.slug.as_str().to_string();
                (key, Resolution::Table(Arc::new(table)))
            })
            .collect())
    }
}

fn resolved_entity(resolution: &Resolution) -> ResolvedEntity {
    match resolution {
        Resolution::Link(link) => match &link.id {
            LinkTarget::Id(id) => ResolvedEntity::Link {
                id: *id,
                name: link.name.clone(),
            },
            LinkTarget::Slug(slug) => ResolvedEntity::Trait {
                slug: slug.clone(),
                name: link.name.clone(),
            },
        },
        Resolution::Table(table) => ResolvedEntity::Table(Box::new(table.as_ref().clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockEntityLookupRepo, MockReferenceTableRepo};
    use chrono::Utc;
    use grimoire_domain::{EntityLink, ReferenceTable, ReferenceTableData};
    use grimoire_shared::ResolveQuery;
    use std::time::Duration;

    fn cache() -> Arc<ResolutionCache> {
        Arc::new(TtlCache::new(Duration::from_secs(60)))
    }

    fn link(id: i64, name: &str) -> EntityLink {
        EntityLink {
            id: LinkTarget::Id(id),
            name: name.into(),
        }
    }

    fn query(kind: &str, name: &str) -> ResolveQuery {
        ResolveQuery {
            kind: kind.into(),
            name: name.into(),
        }
    }

    fn table(slug: &str) -> ReferenceTableData {
        ReferenceTableData::assemble(
            ReferenceTable {
                slug: Slug::new(slug).expect("slug"),
                name: "Turn Undead".into(),
                description: None,
                created_at: Utc::now(),
            },
            vec![],
            vec![],
        )
    }

    #[tokio::test]
    async fn one_lookup_per_kind() {
        let mut entities = MockEntityLookupRepo::new();
        entities
            .expect_find_links()
            .withf(|kind, keys| {
                *kind == EntityKind::Spell && keys == ["fireball".to_string(), "haste".to_string()]
            })
            .times(1)
            .returning(|_, _| Ok(vec![link(12, "Fireball"), link(14, "Haste")]));
        entities
            .expect_find_links()
            .withf(|kind, _| *kind == EntityKind::Feat)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let resolver = ResolveEntities::new(
            Arc::new(entities),
            Arc::new(MockReferenceTableRepo::new()),
            cache(),
        );
        let response = resolver
            .execute(&ResolveRequest {
                queries: vec![
                    query("Spell", "Fireball"),
                    query("spells", "haste"),
                    query("feat", "Dodge"),
                ],
            })
            .await
            .expect("resolve");

        assert_eq!(
            response["spell"]["fireball"],
            Some(ResolvedEntity::Link {
                id: 12,
                name: "Fireball".into()
            })
        );
        assert_eq!(response["feat"]["dodge"], None);
    }

    #[tokio::test]
    async fn unknown_types_fail_the_request() {
        let resolver = ResolveEntities::new(
            Arc::new(MockEntityLookupRepo::new()),
            Arc::new(MockReferenceTableRepo::new()),
            cache(),
        );
        let result = resolver
            .execute(&ResolveRequest {
                queries: vec![query("spell", "Sleep"), query("monster", "Owlbear")],
            })
            .await;
        assert!(matches!(result, Err(ResolveError::UnknownType(t)) if t == "monster"));
    }

    #[tokio::test]
    async fn hits_are_cached_and_misses_are_not() {
        let mut entities = MockEntityLookupRepo::new();
        entities
            .expect_find_links()
            .withf(|_, keys| keys.len() == 2)
            .times(1)
            .returning(|_, _| Ok(vec![link(12, "Fireball")]));
        entities
            .expect_find_links()
            .withf(|_, keys| keys == ["wish".to_string()])
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let resolver = ResolveEntities::new(
            Arc::new(entities),
            Arc::new(MockReferenceTableRepo::new()),
            cache(),
        );
        let mut refs = ReferenceSet::new();
        refs.insert(EntityKind::Spell, "fireball");
        refs.insert(EntityKind::Spell, "wish");

        let first = resolver.resolve(&refs).await.expect("first");
        let second = resolver.resolve(&refs).await.expect("second");
        assert!(first.link(EntityKind::Spell, "fireball").is_some());
        assert!(second.link(EntityKind::Spell, "fireball").is_some());
        assert!(second.get(EntityKind::Spell, "wish").is_none());
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_the_first_match() {
        let mut entities = MockEntityLookupRepo::new();
        entities
            .expect_find_links()
            .returning(|_, _| Ok(vec![link(3, "Alertness"), link(9, "alertness")]));

        let resolver = ResolveEntities::new(
            Arc::new(entities),
            Arc::new(MockReferenceTableRepo::new()),
            cache(),
        );
        let mut refs = ReferenceSet::new();
        refs.insert(EntityKind::Feat, "alertness");
        let resolutions = resolver.resolve(&refs).await.expect("resolve");
        assert_eq!(
            resolutions.link(EntityKind::Feat, "alertness").map(|l| l.id.clone()),
            Some(LinkTarget::Id(3))
        );
    }

    #[tokio::test]
    async fn traits_resolve_by_slug_and_tables_embed() {
        let mut entities = MockEntityLookupRepo::new();
        entities.expect_find_links().returning(|_, _| {
            Ok(vec![EntityLink {
                id: LinkTarget::Slug("darkvision".into()),
                name: "Darkvision".into(),
            }])
        });
        let mut tables = MockReferenceTableRepo::new();
        tables
            .expect_get_many()
            .withf(|slugs| slugs.len() == 1 && slugs[0].as_str() == "turn-undead")
            .returning(|_| Ok(vec![table("turn-undead")]));

        let resolver = ResolveEntities::new(Arc::new(entities), Arc::new(tables), cache());
        let response = resolver
            .execute(&ResolveRequest {
                queries: vec![
                    query("trait", "Darkvision"),
                    query("referencetable", "turn-undead"),
                    query("table", "Not A Slug"),
                ],
            })
            .await
            .expect("resolve");

        assert_eq!(
            response["trait"]["darkvision"],
            Some(ResolvedEntity::Trait {
                slug: "darkvision".into(),
                name: "Darkvision".into()
            })
        );
        assert!(matches!(
            &response["referencetable"]["turn-undead"],
            Some(ResolvedEntity::Table(_))
        ));
        assert_eq!(response["referencetable"]["not a slug"], None);
    }
}
