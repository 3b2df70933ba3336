use async_trait::async_trait;
use grimoire_domain::{
    NamedRef, Page, Race, RaceAbilityAdjustment, RaceId, RaceLanguage, RaceTrait, RaceTraitGrant,
    Slug,
};
use grimoire_shared::{RaceListQuery, RaceRequest, RaceTraitListQuery, RaceTraitRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::query::{db_err, name_key, order_by, push_contains, push_eq, push_page, slug_column};
use crate::infrastructure::ports::{RaceRepo, RaceTraitRepo, RepoError};

const RACE_COLUMNS: &str = "r.id, r.name, r.description, r.size_id, r.speed, \
                            r.favored_class_id, r.edition_id, r.is_visible";

const RACE_SORTS: &[(&str, &str)] = &[("name", "r.name"), ("speed", "r.speed")];

const TRAIT_SORTS: &[(&str, &str)] = &[("name", "t.name"), ("slug", "t.slug")];

// =============================================================================
// Races
// =============================================================================

pub struct SqliteRaceRepo {
    pool: SqlitePool,
}

impl SqliteRaceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &RaceListQuery) {
        push_contains(builder, "r.name", query.name.as_deref());
        push_eq(builder, "r.edition_id", query.edition_id);
        push_eq(builder, "r.is_visible", query.is_visible);
        push_eq(builder, "r.size_id", query.size_id);
        push_eq(builder, "r.speed", query.speed);
        push_eq(builder, "r.favored_class_id", query.favored_class_id);
    }

    fn row_to_race(row: &SqliteRow) -> Result<Race, sqlx::Error> {
        Ok(Race {
            id: RaceId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            size_id: row.try_get("size_id")?,
            speed: row.try_get("speed")?,
            favored_class_id: row.try_get("favored_class_id")?,
            edition_id: row.try_get("edition_id")?,
            is_visible: row.try_get("is_visible")?,
            languages: Vec::new(),
            adjustments: Vec::new(),
            traits: Vec::new(),
        })
    }

    async fn load_relations(&self, race: &mut Race) -> Result<(), sqlx::Error> {
        let id = race.id.get();

        let languages: Vec<(i64, bool)> = sqlx::query_as(
            "SELECT language_id, is_automatic FROM race_languages WHERE race_id = ? ORDER BY language_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        race.languages = languages
            .into_iter()
            .map(|(language_id, is_automatic)| RaceLanguage {
                language_id,
                is_automatic,
            })
            .collect();

        let adjustments: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT ability_id, value FROM race_ability_adjustments WHERE race_id = ? ORDER BY ability_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        race.adjustments = adjustments
            .into_iter()
            .map(|(ability_id, value)| RaceAbilityAdjustment { ability_id, value })
            .collect();

        let traits = sqlx::query(
            r#"
            SELECT g.trait_slug, t.name, g.value
            FROM race_trait_grants g
            JOIN race_traits t ON t.slug = g.trait_slug
            WHERE g.race_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        race.traits = traits
            .iter()
            .map(|row| -> Result<RaceTraitGrant, sqlx::Error> {
                Ok(RaceTraitGrant {
                    trait_slug: slug_column(row, "trait_slug")?,
                    trait_name: row.try_get("name")?,
                    value: row.try_get("value")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(())
    }

    /// Replace whichever relation lists the request carries.
    async fn replace_relations(
        conn: &mut SqliteConnection,
        id: RaceId,
        race: &RaceRequest,
    ) -> Result<(), sqlx::Error> {
        if let Some(languages) = &race.languages {
            sqlx::query("DELETE FROM race_languages WHERE race_id = ?")
                .bind(id.get())
                .execute(&mut *conn)
                .await?;
            for language in languages {
                sqlx::query(
                    "INSERT INTO race_languages (race_id, language_id, is_automatic) VALUES (?, ?, ?)",
                )
                .bind(id.get())
                .bind(language.language_id)
                .bind(language.is_automatic)
                .execute(&mut *conn)
                .await?;
            }
        }

        if let Some(adjustments) = &race.adjustments {
            sqlx::query("DELETE FROM race_ability_adjustments WHERE race_id = ?")
                .bind(id.get())
                .execute(&mut *conn)
                .await?;
            for adjustment in adjustments {
                sqlx::query(
                    "INSERT INTO race_ability_adjustments (race_id, ability_id, value) VALUES (?, ?, ?)",
                )
                .bind(id.get())
                .bind(adjustment.ability_id)
                .bind(adjustment.value)
                .execute(&mut *conn)
                .await?;
            }
        }

        if let Some(traits) = &race.traits {
            sqlx::query("DELETE FROM race_trait_grants WHERE race_id = ?")
                .bind(id.get())
                .execute(&mut *conn)
                .await?;
            for grant in traits {
                sqlx::query(
                    "INSERT INTO race_trait_grants (race_id, trait_slug, value) VALUES (?, ?, ?)",
                )
                .bind(id.get())
                .bind(grant.trait_slug.as_str())
                .bind(&grant.value)
                .execute(&mut *conn)
                .await?;
            }
        }

        Ok(())
    }
}

#[async_trait]
impl RaceRepo for SqliteRaceRepo {
    async fn list(&self, query: &RaceListQuery) -> Result<Page<Race>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM races r WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_races"))?;

        let mut select =
            QueryBuilder::new(format!("SELECT {} FROM races r WHERE 1=1", RACE_COLUMNS));
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            RACE_SORTS,
            query.sort_order(),
            "r.id",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_races"))?;
        let races = rows
            .iter()
            .map(Self::row_to_race)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_races"))?;

        Ok(Page::new(page, total, races))
    }

    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM races ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_race_names"))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| NamedRef { id, name })
            .collect())
    }

    async fn get(&self, id: RaceId) -> Result<Option<Race>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM races r WHERE r.id = ?", RACE_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_race"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut race = Self::row_to_race(&row).map_err(db_err("get_race"))?;
        self.load_relations(&mut race)
            .await
            .map_err(db_err("get_race_relations"))?;
        Ok(Some(race))
    }

    async fn create(&self, race: &RaceRequest) -> Result<RaceId, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("create_race"))?;

        let result = sqlx::query(
            r#"
            INSERT INTO races (name, name_key, description, size_id, speed, favored_class_id,
                               edition_id, is_visible)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&race.name)
        .bind(name_key(&race.name))
        .bind(&race.description)
        .bind(race.size_id)
        .bind(race.speed)
        .bind(race.favored_class_id)
        .bind(race.edition_id)
        .bind(race.is_visible)
        .execute(&mut *tx)
        .await
        .map_err(db_err("create_race"))?;
        let id = RaceId::new(result.last_insert_rowid());

        Self::replace_relations(&mut tx, id, race)
            .await
            .map_err(db_err("create_race_relations"))?;
        tx.commit().await.map_err(db_err("create_race"))?;

        Ok(id)
    }

    async fn update(&self, id: RaceId, race: &RaceRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("update_race"))?;

        let result = sqlx::query(
            r#"
            UPDATE races
            SET name = ?, name_key = ?, description = ?, size_id = ?, speed = ?, favored_class_id = ?,
                edition_id = ?, is_visible = ?
            WHERE id = ?
            "#,
        )
        .bind(&race.name)
        .bind(name_key(&race.name))
        .bind(&race.description)
        .bind(race.size_id)
        .bind(race.speed)
        .bind(race.favored_class_id)
        .bind(race.edition_id)
        .bind(race.is_visible)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(db_err("update_race"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Race", id));
        }

        Self::replace_relations(&mut tx, id, race)
            .await
            .map_err(db_err("update_race_relations"))?;
        tx.commit().await.map_err(db_err("update_race"))?;
        Ok(())
    }

    async fn delete(&self, id: RaceId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM races WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_race"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Race", id));
        }
        Ok(())
    }
}

// =============================================================================
// Race traits
// =============================================================================

pub struct SqliteRaceTraitRepo {
    pool: SqlitePool,
}

impl SqliteRaceTraitRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &RaceTraitListQuery) {
        push_contains(builder, "t.slug", query.slug.as_deref());
        push_contains(builder, "t.name", query.name.as_deref());
        push_eq(builder, "t.has_value", query.has_value);
    }

    fn row_to_trait(row: &SqliteRow) -> Result<RaceTrait, sqlx::Error> {
        Ok(RaceTrait {
            slug: slug_column(row, "slug")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            has_value: row.try_get("has_value")?,
        })
    }
}

#[async_trait]
impl RaceTraitRepo for SqliteRaceTraitRepo {
    async fn list(&self, query: &RaceTraitListQuery) -> Result<Page<RaceTrait>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM race_traits t WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_race_traits"))?;

        let mut select = QueryBuilder::new(
            "SELECT t.slug, t.name, t.description, t.has_value FROM race_traits t WHERE 1=1",
        );
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            TRAIT_SORTS,
            query.sort_order(),
            "t.slug",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_race_traits"))?;
        let traits = rows
            .iter()
            .map(Self::row_to_trait)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_race_traits"))?;

        Ok(Page::new(page, total, traits))
    }

    async fn list_all(&self) -> Result<Vec<RaceTrait>, RepoError> {
        let rows = sqlx::query(
            "SELECT slug, name, description, has_value FROM race_traits ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("list_all_race_traits"))?;
        rows.iter()
            .map(Self::row_to_trait)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_all_race_traits"))
    }

    async fn get(&self, slug: &Slug) -> Result<Option<RaceTrait>, RepoError> {
        let row = sqlx::query(
            "SELECT slug, name, description, has_value FROM race_traits WHERE slug = ?",
        )
        .bind(slug.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("get_race_trait"))?;
        row.as_ref()
            .map(Self::row_to_trait)
            .transpose()
            .map_err(db_err("get_race_trait"))
    }

    async fn create(&self, race_trait: &RaceTraitRequest) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO race_traits (slug, name, description, has_value) VALUES (?, ?, ?, ?)",
        )
        .bind(race_trait.slug.as_str())
        .bind(&race_trait.name)
        .bind(&race_trait.description)
        .bind(race_trait.has_value)
        .execute(&self.pool)
        .await
        .map_err(db_err("create_race_trait"))?;
        Ok(())
    }

    async fn update(&self, slug: &Slug, race_trait: &RaceTraitRequest) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE race_traits SET slug = ?, name = ?, description = ?, has_value = ? WHERE slug = ?",
        )
        .bind(race_trait.slug.as_str())
        .bind(&race_trait.name)
        .bind(&race_trait.description)
        .bind(race_trait.has_value)
        .bind(slug.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("update_race_trait"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("RaceTrait", slug.as_str()));
        }
        Ok(())
    }

    async fn delete(&self, slug: &Slug) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM race_traits WHERE slug = ?")
            .bind(slug.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_race_trait"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("RaceTrait", slug.as_str()));
        }
        Ok(())
    }
}
