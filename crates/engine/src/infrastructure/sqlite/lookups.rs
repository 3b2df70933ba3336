use async_trait::async_trait;
use grimoire_domain::{LookupEntry, LookupKind};
use sqlx::SqlitePool;

use super::query::db_err;
use crate::infrastructure::ports::{LookupRepo, RepoError};

pub struct SqliteLookupRepo {
    pool: SqlitePool,
}

impl SqliteLookupRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LookupRepo for SqliteLookupRepo {
    async fn load_all(&self) -> Result<Vec<(LookupKind, LookupEntry)>, RepoError> {
        let rows: Vec<(String, i64, String, Option<String>)> = sqlx::query_as(
            "SELECT kind, id, name, abbreviation FROM lookups ORDER BY kind, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("load_lookups"))?;

        let mut entries = Vec::with_capacity(rows.len());
        for (kind, id, name, abbreviation) in rows {
            // Rows for lists this build doesn't know about are ignored.
            let Ok(kind) = kind.parse::<LookupKind>() else {
                tracing::warn!(kind = %kind, id, "Skipping lookup row of unknown kind");
                continue;
            };
            entries.push((
                kind,
                LookupEntry {
                    id,
                    name,
                    abbreviation,
                },
            ));
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::testing;

    #[tokio::test]
    async fn loads_seeded_lists() {
        let pool = testing::pool().await;
        sqlx::query("INSERT INTO lookups (kind, id, name) VALUES ('monsters', 1, 'Owlbear')")
            .execute(&pool)
            .await
            .expect("insert");

        let entries = SqliteLookupRepo::new(pool).load_all().await.expect("load");
        assert!(entries
            .iter()
            .any(|(kind, e)| *kind == LookupKind::Schools && e.name == "Evocation"));
        assert!(!entries.iter().any(|(_, e)| e.name == "Owlbear"));
    }
}
