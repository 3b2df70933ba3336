//! Batched name lookups for cross-entity references.

use async_trait::async_trait;
use grimoire_domain::{EntityKind, EntityLink, LinkTarget};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::query::db_err;
use crate::infrastructure::ports::{EntityLookupRepo, RepoError};

pub struct SqliteEntityLookupRepo {
    pool: SqlitePool,
}

impl SqliteEntityLookupRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Table holding a name-keyed kind.
    fn named_table(kind: EntityKind) -> Option<&'static str> {
        match kind {
            EntityKind::Spell => Some("spells"),
            EntityKind::Feat => Some("feats"),
            EntityKind::Skill => Some("skills"),
            EntityKind::Class => Some("classes"),
            EntityKind::Race => Some("races"),
            EntityKind::Character => Some("characters"),
            EntityKind::Trait | EntityKind::ReferenceTable => None,
        }
    }

    /// `keys` are trimmed and lower-cased, the same as the stored `name_key`.
    async fn find_by_name(
        &self,
        table: &str,
        keys: &[String],
    ) -> Result<Vec<EntityLink>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT id, name FROM {} WHERE name_key IN (",
            table
        ));
        let mut list = builder.separated(", ");
        for key in keys {
            list.push_bind(key.clone());
        }
        list.push_unseparated(") ORDER BY id");

        let rows: Vec<(i64, String)> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| EntityLink {
                id: LinkTarget::Id(id),
                name,
            })
            .collect())
    }

    async fn find_traits(&self, keys: &[String]) -> Result<Vec<EntityLink>, sqlx::Error> {
        let mut builder =
            QueryBuilder::<Sqlite>::new("SELECT slug, name FROM race_traits WHERE slug IN (");
        let mut list = builder.separated(", ");
        for key in keys {
            list.push_bind(key.clone());
        }
        list.push_unseparated(")");

        let rows: Vec<(String, String)> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(slug, name)| EntityLink {
                id: LinkTarget::Slug(slug),
                name,
            })
            .collect())
    }
}

#[async_trait]
impl EntityLookupRepo for SqliteEntityLookupRepo {
    async fn find_links(
        &self,
        kind: EntityKind,
        keys: &[String],
    ) -> Result<Vec<EntityLink>, RepoError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let links = match (kind, Self::named_table(kind)) {
            (_, Some(table)) => self.find_by_name(table, keys).await,
            (EntityKind::Trait, None) => self.find_traits(keys).await,
            _ => Ok(Vec::new()),
        };
        links.map_err(db_err("find_entity_links"))
    }
}
