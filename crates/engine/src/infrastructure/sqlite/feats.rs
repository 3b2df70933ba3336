use async_trait::async_trait;
use grimoire_domain::{Feat, FeatEffect, FeatId, NamedRef, Page};
use grimoire_shared::{FeatEffectRequest, FeatListQuery, FeatRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::query::{db_err, name_key, order_by, push_contains, push_eq, push_page};
use crate::infrastructure::ports::{FeatRepo, RepoError};

const FEAT_COLUMNS: &str = "f.id, f.name, f.type_id, f.description, f.benefit, f.normal_effect, \
                            f.special_effect, f.prerequisites, f.repeatable, f.fighter_bonus";

const FEAT_SORTS: &[(&str, &str)] = &[("name", "f.name"), ("typeId", "f.type_id")];

/// The two structured effect tables share a layout.
#[derive(Clone, Copy)]
enum EffectTable {
    Benefits,
    Prereqs,
}

impl EffectTable {
    fn name(self) -> &'static str {
        match self {
            Self::Benefits => "feat_benefits",
            Self::Prereqs => "feat_prereqs",
        }
    }
}

pub struct SqliteFeatRepo {
    pool: SqlitePool,
}

impl SqliteFeatRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &FeatListQuery) {
        push_contains(builder, "f.name", query.name.as_deref());
        push_eq(builder, "f.type_id", query.type_id);
        push_contains(builder, "f.description", query.description.as_deref());
        push_contains(builder, "f.benefit", query.benefit.as_deref());
        push_contains(builder, "f.normal_effect", query.normal_effect.as_deref());
        push_contains(builder, "f.special_effect", query.special_effect.as_deref());
        push_contains(builder, "f.prerequisites", query.prerequisites.as_deref());
        push_eq(builder, "f.repeatable", query.repeatable);
    }

    fn row_to_feat(row: &SqliteRow) -> Result<Feat, sqlx::Error> {
        Ok(Feat {
            id: FeatId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            type_id: row.try_get("type_id")?,
            description: row.try_get("description")?,
            benefit: row.try_get("benefit")?,
            normal_effect: row.try_get("normal_effect")?,
            special_effect: row.try_get("special_effect")?,
            prerequisites: row.try_get("prerequisites")?,
            repeatable: row.try_get("repeatable")?,
            fighter_bonus: row.try_get("fighter_bonus")?,
            benefits: Vec::new(),
            prereqs: Vec::new(),
        })
    }

    async fn load_effects(
        &self,
        id: FeatId,
        table: EffectTable,
    ) -> Result<Vec<FeatEffect>, sqlx::Error> {
        let rows: Vec<(i64, i64, Option<i64>, Option<i64>)> = sqlx::query_as(&format!(
            "SELECT effect_index, type_id, reference_id, amount FROM {} \
             WHERE feat_id = ? ORDER BY effect_index",
            table.name()
        ))
        .bind(id.get())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(index, type_id, reference_id, amount)| FeatEffect {
                index,
                type_id,
                reference_id,
                amount,
            })
            .collect())
    }

    async fn replace_effects(
        conn: &mut SqliteConnection,
        id: FeatId,
        table: EffectTable,
        effects: Option<&[FeatEffectRequest]>,
    ) -> Result<(), sqlx::Error> {
        let Some(effects) = effects else {
            return Ok(());
        };
        sqlx::query(&format!("DELETE FROM {} WHERE feat_id = ?", table.name()))
            .bind(id.get())
            .execute(&mut *conn)
            .await?;
        let insert = format!(
            "INSERT INTO {} (feat_id, effect_index, type_id, reference_id, amount) \
             VALUES (?, ?, ?, ?, ?)",
            table.name()
        );
        for effect in effects {
            sqlx::query(&insert)
                .bind(id.get())
                .bind(effect.index)
                .bind(effect.type_id)
                .bind(effect.reference_id)
                .bind(effect.amount)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    async fn replace_all_effects(
        conn: &mut SqliteConnection,
        id: FeatId,
        feat: &FeatRequest,
    ) -> Result<(), sqlx::Error> {
        Self::replace_effects(conn, id, EffectTable::Benefits, feat.benefits.as_deref()).await?;
        Self::replace_effects(conn, id, EffectTable::Prereqs, feat.prereqs.as_deref()).await
    }
}

#[async_trait]
impl FeatRepo for SqliteFeatRepo {
    async fn list(&self, query: &FeatListQuery) -> Result<Page<Feat>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM feats f WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_feats"))?;

        let mut select =
            QueryBuilder::new(format!("SELECT {} FROM feats f WHERE 1=1", FEAT_COLUMNS));
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            FEAT_SORTS,
            query.sort_order(),
            "f.id",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_feats"))?;
        let feats = rows
            .iter()
            .map(Self::row_to_feat)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_feats"))?;

        Ok(Page::new(page, total, feats))
    }

    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM feats ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_feat_names"))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| NamedRef { id, name })
            .collect())
    }

    async fn get(&self, id: FeatId) -> Result<Option<Feat>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM feats f WHERE f.id = ?", FEAT_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_feat"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut feat = Self::row_to_feat(&row).map_err(db_err("get_feat"))?;
        feat.benefits = self
            .load_effects(id, EffectTable::Benefits)
            .await
            .map_err(db_err("get_feat_benefits"))?;
        feat.prereqs = self
            .load_effects(id, EffectTable::Prereqs)
            .await
            .map_err(db_err("get_feat_prereqs"))?;
        Ok(Some(feat))
    }

    async fn create(&self, feat: &FeatRequest) -> Result<FeatId, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("create_feat"))?;

        let result = sqlx::query(
            r#"
            INSERT INTO feats (name, name_key, type_id, description, benefit, normal_effect,
                               special_effect, prerequisites, repeatable, fighter_bonus)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&feat.name)
        .bind(name_key(&feat.name))
        .bind(feat.type_id)
        .bind(&feat.description)
        .bind(&feat.benefit)
        .bind(&feat.normal_effect)
        .bind(&feat.special_effect)
        .bind(&feat.prerequisites)
        .bind(feat.repeatable)
        .bind(feat.fighter_bonus)
        .execute(&mut *tx)
        .await
        .map_err(db_err("create_feat"))?;
        let id = FeatId::new(result.last_insert_rowid());

        Self::replace_all_effects(&mut tx, id, feat)
            .await
            .map_err(db_err("create_feat_effects"))?;
        tx.commit().await.map_err(db_err("create_feat"))?;

        Ok(id)
    }

    async fn update(&self, id: FeatId, feat: &FeatRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("update_feat"))?;

        let result = sqlx::query(
            r#"
            UPDATE feats
            SET name = ?, name_key = ?, type_id = ?, description = ?, benefit = ?, normal_effect = ?,
                special_effect = ?, prerequisites = ?, repeatable = ?, fighter_bonus = ?
            WHERE id = ?
            "#,
        )
        .bind(&feat.name)
        .bind(name_key(&feat.name))
        .bind(feat.type_id)
        .bind(&feat.description)
        .bind(&feat.benefit)
        .bind(&feat.normal_effect)
        .bind(&feat.special_effect)
        .bind(&feat.prerequisites)
        .bind(feat.repeatable)
        .bind(feat.fighter_bonus)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(db_err("update_feat"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Feat", id));
        }

        Self::replace_all_effects(&mut tx, id, feat)
            .await
            .map_err(db_err("update_feat_effects"))?;
        tx.commit().await.map_err(db_err("update_feat"))?;
        Ok(())
    }

    async fn delete(&self, id: FeatId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM feats WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_feat"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Feat", id));
        }
        Ok(())
    }
}
