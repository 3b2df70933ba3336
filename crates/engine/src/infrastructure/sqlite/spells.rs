use std::collections::HashMap;

use async_trait::async_trait;
use grimoire_domain::{editions_matching, ClassId, NamedRef, Page, Spell, SpellClassLevel, SpellId};
use grimoire_shared::{SpellListFilters, SpellListQuery, SpellRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::query::{db_err, name_key, order_by, push_contains, push_eq, push_in, push_page};
use crate::infrastructure::ports::{RepoError, SpellRepo};

const SPELL_COLUMNS: &str = "s.id, s.name, s.edition_id, s.base_level, s.summary, s.description, \
                             s.casting_time, s.range_text, s.range_type_id, s.range_value, \
                             s.area, s.duration, s.saving_throw, s.spell_resistance, s.effect, \
                             s.target";

const SPELL_SORTS: &[(&str, &str)] = &[("name", "s.name"), ("baseLevel", "s.base_level")];

/// Join tables holding plain id sets: (table, id column).
const SCHOOLS: (&str, &str) = ("spell_schools", "school_id");
const SUBSCHOOLS: (&str, &str) = ("spell_subschools", "subschool_id");
const DESCRIPTORS: (&str, &str) = ("spell_descriptors", "descriptor_id");
const COMPONENTS: (&str, &str) = ("spell_components", "component_id");

pub struct SqliteSpellRepo {
    pool: SqlitePool,
}

impl SqliteSpellRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(
        builder: &mut QueryBuilder<'_, Sqlite>,
        query: &SpellListQuery,
        filters: &SpellListFilters,
    ) {
        push_contains(builder, "s.name", query.name.as_deref());
        if let Some(edition_id) = query.edition_id {
            push_in(builder, "s.edition_id", &editions_matching(edition_id));
        }
        push_eq(builder, "s.base_level", query.base_level);

        // Class and level must match on the same visible mapping.
        if !filters.class_ids.is_empty() || !filters.spell_levels.is_empty() {
            builder.push(
                " AND EXISTS (SELECT 1 FROM spell_class_levels l \
                 WHERE l.spell_id = s.id AND l.is_visible = 1",
            );
            push_in(builder, "l.class_id", &filters.class_ids);
            push_in(builder, "l.level", &filters.spell_levels);
            builder.push(")");
        }

        for ((table, column), ids) in [
            (SCHOOLS, &filters.school_ids),
            (DESCRIPTORS, &filters.descriptor_ids),
            (COMPONENTS, &filters.component_ids),
        ] {
            if ids.is_empty() {
                continue;
            }
            builder.push(format!(
                " AND EXISTS (SELECT 1 FROM {} x WHERE x.spell_id = s.id",
                table
            ));
            push_in(builder, &format!("x.{}", column), ids);
            builder.push(")");
        }
    }

    fn row_to_spell(row: &SqliteRow) -> Result<Spell, sqlx::Error> {
        Ok(Spell {
            id: SpellId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            edition_id: row.try_get("edition_id")?,
            base_level: row.try_get("base_level")?,
            summary: row.try_get("summary")?,
            description: row.try_get("description")?,
            casting_time: row.try_get("casting_time")?,
            range: row.try_get("range_text")?,
            range_type_id: row.try_get("range_type_id")?,
            range_value: row.try_get("range_value")?,
            area: row.try_get("area")?,
            duration: row.try_get("duration")?,
            saving_throw: row.try_get("saving_throw")?,
            spell_resistance: row.try_get("spell_resistance")?,
            effect: row.try_get("effect")?,
            target: row.try_get("target")?,
            school_ids: Vec::new(),
            subschool_ids: Vec::new(),
            descriptor_ids: Vec::new(),
            component_ids: Vec::new(),
            levels: Vec::new(),
        })
    }

    async fn load_id_sets(
        &self,
        (table, column): (&str, &str),
        spell_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<i64>>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!(
            "SELECT spell_id, {} FROM {} WHERE 1=1",
            column, table
        ));
        push_in(&mut builder, "spell_id", spell_ids);
        builder.push(format!(" ORDER BY {}", column));

        let rows: Vec<(i64, i64)> = builder.build_query_as().fetch_all(&self.pool).await?;
        let mut sets: HashMap<i64, Vec<i64>> = HashMap::new();
        for (spell_id, id) in rows {
            sets.entry(spell_id).or_default().push(id);
        }
        Ok(sets)
    }

    async fn load_levels(
        &self,
        spell_ids: &[i64],
        visible_only: bool,
    ) -> Result<HashMap<i64, Vec<SpellClassLevel>>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT l.spell_id, l.class_id, c.name, c.abbreviation, l.level, l.is_visible \
             FROM spell_class_levels l JOIN classes c ON c.id = l.class_id WHERE 1=1",
        );
        push_in(&mut builder, "l.spell_id", spell_ids);
        if visible_only {
            builder.push(" AND l.is_visible = 1");
        }
        builder.push(" ORDER BY l.level, c.name");

        let rows = builder.build().fetch_all(&self.pool).await?;
        let mut levels: HashMap<i64, Vec<SpellClassLevel>> = HashMap::new();
        for row in &rows {
            let spell_id: i64 = row.try_get("spell_id")?;
            levels.entry(spell_id).or_default().push(SpellClassLevel {
                class_id: ClassId::new(row.try_get("class_id")?),
                class_name: row.try_get("name")?,
                class_abbreviation: row.try_get("abbreviation")?,
                level: row.try_get("level")?,
                is_visible: row.try_get("is_visible")?,
            });
        }
        Ok(levels)
    }

    /// Fill in id sets and class levels for a batch of spells.
    async fn load_relations(
        &self,
        spells: &mut [Spell],
        visible_levels_only: bool,
    ) -> Result<(), sqlx::Error> {
        if spells.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = spells.iter().map(|s| s.id.get()).collect();

        let mut schools = self.load_id_sets(SCHOOLS, &ids).await?;
        let mut subschools = self.load_id_sets(SUBSCHOOLS, &ids).await?;
        let mut descriptors = self.load_id_sets(DESCRIPTORS, &ids).await?;
        let mut components = self.load_id_sets(COMPONENTS, &ids).await?;
        let mut levels = self.load_levels(&ids, visible_levels_only).await?;

        for spell in spells.iter_mut() {
            let id = spell.id.get();
            spell.school_ids = schools.remove(&id).unwrap_or_default();
            spell.subschool_ids = subschools.remove(&id).unwrap_or_default();
            spell.descriptor_ids = descriptors.remove(&id).unwrap_or_default();
            spell.component_ids = components.remove(&id).unwrap_or_default();
            spell.levels = levels.remove(&id).unwrap_or_default();
        }
        Ok(())
    }

    async fn replace_id_set(
        conn: &mut SqliteConnection,
        (table, column): (&str, &str),
        id: SpellId,
        values: Option<&[i64]>,
    ) -> Result<(), sqlx::Error> {
        let Some(values) = values else {
            return Ok(());
        };
        sqlx::query(&format!("DELETE FROM {} WHERE spell_id = ?", table))
            .bind(id.get())
            .execute(&mut *conn)
            .await?;
        let insert = format!(
            "INSERT OR IGNORE INTO {} (spell_id, {}) VALUES (?, ?)",
            table, column
        );
        for value in values {
            sqlx::query(&insert)
                .bind(id.get())
                .bind(*value)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    async fn replace_relations(
        conn: &mut SqliteConnection,
        id: SpellId,
        spell: &SpellRequest,
    ) -> Result<(), sqlx::Error> {
        Self::replace_id_set(conn, SCHOOLS, id, spell.school_ids.as_deref()).await?;
        Self::replace_id_set(conn, SUBSCHOOLS, id, spell.subschool_ids.as_deref()).await?;
        Self::replace_id_set(conn, DESCRIPTORS, id, spell.descriptor_ids.as_deref()).await?;
        Self::replace_id_set(conn, COMPONENTS, id, spell.component_ids.as_deref()).await?;

        if let Some(levels) = &spell.levels {
            sqlx::query("DELETE FROM spell_class_levels WHERE spell_id = ?")
                .bind(id.get())
                .execute(&mut *conn)
                .await?;
            for level in levels {
                sqlx::query(
                    "INSERT INTO spell_class_levels (spell_id, class_id, level, is_visible) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(id.get())
                .bind(level.class_id)
                .bind(level.level)
                .bind(level.is_visible)
                .execute(&mut *conn)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SpellRepo for SqliteSpellRepo {
    async fn list(
        &self,
        query: &SpellListQuery,
        filters: &SpellListFilters,
    ) -> Result<Page<Spell>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM spells s WHERE 1=1");
        Self::push_filters(&mut count, query, filters);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_spells"))?;

        let mut select =
            QueryBuilder::new(format!("SELECT {} FROM spells s WHERE 1=1", SPELL_COLUMNS));
        Self::push_filters(&mut select, query, filters);
        select.push(order_by(
            query.sort.as_deref(),
            SPELL_SORTS,
            query.sort_order(),
            "s.id",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_spells"))?;
        let mut spells = rows
            .iter()
            .map(Self::row_to_spell)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_spells"))?;
        self.load_relations(&mut spells, true)
            .await
            .map_err(db_err("list_spell_relations"))?;

        Ok(Page::new(page, total, spells))
    }

    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM spells ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("list_spell_names"))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| NamedRef { id, name })
            .collect())
    }

    async fn get(&self, id: SpellId) -> Result<Option<Spell>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM spells s WHERE s.id = ?", SPELL_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_spell"))?;
        let Some(row) = row else {
            return Ok(None);
        };

        let spell = Self::row_to_spell(&row).map_err(db_err("get_spell"))?;
        let mut spells = [spell];
        self.load_relations(&mut spells, false)
            .await
            .map_err(db_err("get_spell_relations"))?;
        let [spell] = spells;
        Ok(Some(spell))
    }

    async fn create(&self, spell: &SpellRequest) -> Result<SpellId, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("create_spell"))?;

        let result = sqlx::query(
            r#"
            INSERT INTO spells (name, name_key, edition_id, base_level, summary, description, casting_time,
                                range_text, range_type_id, range_value, area, duration,
                                saving_throw, spell_resistance, effect, target)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&spell.name)
        .bind(name_key(&spell.name))
        .bind(spell.edition_id)
        .bind(spell.base_level)
        .bind(&spell.summary)
        .bind(&spell.description)
        .bind(&spell.casting_time)
        .bind(&spell.range)
        .bind(spell.range_type_id)
        .bind(&spell.range_value)
        .bind(&spell.area)
        .bind(&spell.duration)
        .bind(&spell.saving_throw)
        .bind(&spell.spell_resistance)
        .bind(&spell.effect)
        .bind(&spell.target)
        .execute(&mut *tx)
        .await
        .map_err(db_err("create_spell"))?;
        let id = SpellId::new(result.last_insert_rowid());

        Self::replace_relations(&mut tx, id, spell)
            .await
            .map_err(db_err("create_spell_relations"))?;
        tx.commit().await.map_err(db_err("create_spell"))?;

        Ok(id)
    }

    async fn update(&self, id: SpellId, spell: &SpellRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("update_spell"))?;

        let result = sqlx::query(
            r#"
            UPDATE spells
            SET name = ?, name_key = ?, edition_id = ?, base_level = ?, summary = ?, description = ?,
                casting_time = ?, range_text = ?, range_type_id = ?, range_value = ?,
                area = ?, duration = ?, saving_throw = ?, spell_resistance = ?,
                effect = ?, target = ?
            WHERE id = ?
            "#,
        )
        .bind(&spell.name)
        .bind(name_key(&spell.name))
        .bind(spell.edition_id)
        .bind(spell.base_level)
        .bind(&spell.summary)
        .bind(&spell.description)
        .bind(&spell.casting_time)
        .bind(&spell.range)
        .bind(spell.range_type_id)
        .bind(&spell.range_value)
        .bind(&spell.area)
        .bind(&spell.duration)
        .bind(&spell.saving_throw)
        .bind(&spell.spell_resistance)
        .bind(&spell.effect)
        .bind(&spell.target)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(db_err("update_spell"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Spell", id));
        }

        Self::replace_relations(&mut tx, id, spell)
            .await
            .map_err(db_err("update_spell_relations"))?;
        tx.commit().await.map_err(db_err("update_spell"))?;
        Ok(())
    }

    async fn delete(&self, id: SpellId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM spells WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_spell"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Spell", id));
        }
        Ok(())
    }
}
