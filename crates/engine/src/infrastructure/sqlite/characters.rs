use std::sync::Arc;

use async_trait::async_trait;
use grimoire_domain::{Character, CharacterId, Page, RaceId, UserId};
use grimoire_shared::{CharacterListQuery, CharacterRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::query::{db_err, name_key, order_by, push_contains, push_eq, push_page};
use crate::infrastructure::ports::{CharacterRepo, ClockPort, RepoError};

const CHARACTER_SELECT: &str = "SELECT ch.id, ch.user_id, ch.name, ch.race_id, r.name AS race_name, \
                                ch.alignment_id, ch.age, ch.height, ch.weight, ch.eyes, ch.hair, \
                                ch.gender, ch.notes, ch.created_at \
                                FROM characters ch LEFT JOIN races r ON r.id = ch.race_id";

const CHARACTER_SORTS: &[(&str, &str)] = &[
    ("name", "ch.name"),
    ("createdAt", "ch.created_at"),
    ("age", "ch.age"),
];

pub struct SqliteCharacterRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteCharacterRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &CharacterListQuery) {
        push_contains(builder, "ch.name", query.name.as_deref());
        push_eq(builder, "ch.user_id", query.user_id);
    }

    fn row_to_character(row: &SqliteRow) -> Result<Character, sqlx::Error> {
        Ok(Character {
            id: CharacterId::new(row.try_get("id")?),
            user_id: UserId::new(row.try_get("user_id")?),
            name: row.try_get("name")?,
            race_id: RaceId::new(row.try_get("race_id")?),
            race_name: row.try_get("race_name")?,
            alignment_id: row.try_get("alignment_id")?,
            age: row.try_get("age")?,
            height: row.try_get("height")?,
            weight: row.try_get("weight")?,
            eyes: row.try_get("eyes")?,
            hair: row.try_get("hair")?,
            gender: row.try_get("gender")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[async_trait]
impl CharacterRepo for SqliteCharacterRepo {
    async fn list(&self, query: &CharacterListQuery) -> Result<Page<Character>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM characters ch WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_characters"))?;

        let mut select = QueryBuilder::new(format!("{} WHERE 1=1", CHARACTER_SELECT));
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            CHARACTER_SORTS,
            query.sort_order(),
            "ch.id",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_characters"))?;
        let characters = rows
            .iter()
            .map(Self::row_to_character)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_characters"))?;

        Ok(Page::new(page, total, characters))
    }

    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError> {
        let row = sqlx::query(&format!("{} WHERE ch.id = ?", CHARACTER_SELECT))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_character"))?;
        row.as_ref()
            .map(Self::row_to_character)
            .transpose()
            .map_err(db_err("get_character"))
    }

    async fn create(
        &self,
        owner: UserId,
        character: &CharacterRequest,
    ) -> Result<CharacterId, RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO characters (user_id, name, name_key, race_id, alignment_id, age, height, weight,
                                    eyes, hair, gender, notes, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(owner.get())
        .bind(character.name.trim())
        .bind(name_key(&character.name))
        .bind(character.race_id)
        .bind(character.alignment_id)
        .bind(character.age)
        .bind(character.height)
        .bind(character.weight)
        .bind(&character.eyes)
        .bind(&character.hair)
        .bind(&character.gender)
        .bind(&character.notes)
        .bind(self.clock.now())
        .execute(&self.pool)
        .await
        .map_err(db_err("create_character"))?;

        Ok(CharacterId::new(result.last_insert_rowid()))
    }

    async fn update(
        &self,
        id: CharacterId,
        owner: UserId,
        character: &CharacterRequest,
    ) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE characters
            SET user_id = ?, name = ?, name_key = ?, race_id = ?, alignment_id = ?, age = ?, height = ?,
                weight = ?, eyes = ?, hair = ?, gender = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(owner.get())
        .bind(character.name.trim())
        .bind(name_key(&character.name))
        .bind(character.race_id)
        .bind(character.alignment_id)
        .bind(character.age)
        .bind(character.height)
        .bind(character.weight)
        .bind(&character.eyes)
        .bind(&character.hair)
        .bind(&character.gender)
        .bind(&character.notes)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(db_err("update_character"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        Ok(())
    }

    async fn delete(&self, id: CharacterId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM characters WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_character"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Character", id));
        }
        Ok(())
    }
}
