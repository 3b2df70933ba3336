use async_trait::async_trait;
use grimoire_domain::{NamedRef, Page, Skill, SkillId};
use grimoire_shared::{SkillListQuery, SkillRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use super::query::{db_err, name_key, order_by, push_contains, push_eq, push_page};
use crate::infrastructure::ports::{RepoError, SkillRepo};

const SKILL_COLUMNS: &str = "s.id, s.name, s.ability_id, s.trained_only, s.affected_by_armor, \
                             s.description, s.check_description, s.action_description, \
                             s.retry_type_id, s.retry_description, s.special_notes, \
                             s.synergy_notes, s.untrained_notes";

const SKILL_SORTS: &[(&str, &str)] = &[("name", "s.name"), ("abilityId", "s.ability_id")];

pub struct SqliteSkillRepo {
    pool: SqlitePool,
}

impl SqliteSkillRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &SkillListQuery) {
        push_contains(builder, "s.name", query.name.as_deref());
        push_eq(builder, "s.ability_id", query.ability_id);
        push_eq(builder, "s.trained_only", query.trained_only);
        push_eq(builder, "s.affected_by_armor", query.affected_by_armor);
    }

    fn row_to_skill(row: &SqliteRow) -> Result<Skill, sqlx::Error> {
        Ok(Skill {
            id: SkillId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            ability_id: row.try_get("ability_id")?,
            trained_only: row.try_get("trained_only")?,
            affected_by_armor: row.try_get("affected_by_armor")?,
            description: row.try_get("description")?,
            check_description: row.try_get("check_description")?,
            action_description: row.try_get("action_description")?,
            retry_type_id: row.try_get("retry_type_id")?,
            retry_description: row.try_get("retry_description")?,
            special_notes: row.try_get("special_notes")?,
            synergy_notes: row.try_get("synergy_notes")?,
            untrained_notes: row.try_get("untrained_notes")?,
        })
    }
}

#[async_trait]
impl SkillRepo for SqliteSkillRepo {
    async fn list(&self, query: &SkillListQuery) -> Result<Page<Skill>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM skills s WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_skills"))?;

        let mut select =
            QueryBuilder::new(format!("SELECT {} FROM skills s WHERE 1=1", SKILL_COLUMNS));
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            SKILL_SORTS,
            query.sort_order(),
            "s.id",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_skills"))?;
        let skills = rows
            .iter()
            .map(Self::row_to_skill)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_skills"))?;

        Ok(Page::new(page, total, skills))
    }

    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError> {
        let rows: Vec<(i64, String)> = sqlx::query_as("SELECT id, name FROM skills ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_skill_names"))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| NamedRef { id, name })
            .collect())
    }

    async fn get(&self, id: SkillId) -> Result<Option<Skill>, RepoError> {
        let row = sqlx::query(&format!("SELECT {} FROM skills s WHERE s.id = ?", SKILL_COLUMNS))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_skill"))?;
        row.as_ref()
            .map(Self::row_to_skill)
            .transpose()
            .map_err(db_err("get_skill"))
    }

    async fn create(&self, skill: &SkillRequest) -> Result<SkillId, RepoError> {
        let result = sqlx::query(
            r#"
            INSERT INTO skills (name, name_key, ability_id, trained_only, affected_by_armor, description,
                                check_description, action_description, retry_type_id,
                                retry_description, special_notes, synergy_notes,
                                untrained_notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&skill.name)
        .bind(name_key(&skill.name))
        .bind(skill.ability_id)
        .bind(skill.trained_only)
        .bind(skill.affected_by_armor)
        .bind(&skill.description)
        .bind(&skill.check_description)
        .bind(&skill.action_description)
        .bind(skill.retry_type_id)
        .bind(&skill.retry_description)
        .bind(&skill.special_notes)
        .bind(&skill.synergy_notes)
        .bind(&skill.untrained_notes)
        .execute(&self.pool)
        .await
        .map_err(db_err("create_skill"))?;

        Ok(SkillId::new(result.last_insert_rowid()))
    }

    async fn update(&self, id: SkillId, skill: &SkillRequest) -> Result<(), RepoError> {
        let result = sqlx::query(
            r#"
            UPDATE skills
            SET name = ?, name_key = ?, ability_id = ?, trained_only = ?, affected_by_armor = ?,
                description = ?, check_description = ?, action_description = ?,
                retry_type_id = ?, retry_description = ?, special_notes = ?,
                synergy_notes = ?, untrained_notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&skill.name)
        .bind(name_key(&skill.name))
        .bind(skill.ability_id)
        .bind(skill.trained_only)
        .bind(skill.affected_by_armor)
        .bind(&skill.description)
        .bind(&skill.check_description)
        .bind(&skill.action_description)
        .bind(skill.retry_type_id)
        .bind(&skill.retry_description)
        .bind(&skill.special_notes)
        .bind(&skill.synergy_notes)
        .bind(&skill.untrained_notes)
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(db_err("update_skill"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Skill", id));
        }
        Ok(())
    }

    async fn delete(&self, id: SkillId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM skills WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_skill"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Skill", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::testing;

    fn skill(name: &str, ability_id: i64, trained_only: bool) -> SkillRequest {
        SkillRequest {
            name: name.into(),
            ability_id,
            trained_only,
            affected_by_armor: false,
            description: None,
            check_description: Some("DC 15".into()),
            action_description: None,
            retry_type_id: None,
            retry_description: None,
            special_notes: None,
            synergy_notes: None,
            untrained_notes: None,
        }
    }

    #[tokio::test]
    async fn crud_cycle() {
        let repo = SqliteSkillRepo::new(testing::pool().await);
        let id = repo
            .create(&skill("Spellcraft", 4, true))
            .await
            .expect("create");
        assert_eq!(
            repo.get(id).await.expect("get").map(|s| s.check_description),
            Some(Some("DC 15".into()))
        );

        repo.update(id, &skill("Spellcraft", 5, true))
            .await
            .expect("update");
        assert_eq!(
            repo.get(id).await.expect("get").map(|s| s.ability_id),
            Some(5)
        );

        repo.delete(id).await.expect("delete");
        assert!(repo.get(id).await.expect("get").is_none());
        assert!(repo.delete(id).await.is_err_and(|e| e.is_not_found()));
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let repo = SqliteSkillRepo::new(testing::pool().await);
        repo.create(&skill("Hide", 2, false)).await.expect("create");
        let err = repo
            .create(&skill("Hide", 2, false))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, RepoError::Conflict(_)));
    }

    #[tokio::test]
    async fn list_filters_and_pages() {
        let repo = SqliteSkillRepo::new(testing::pool().await);
        for (name, trained) in [("Tumble", true), ("Hide", false), ("Spot", false)] {
            repo.create(&skill(name, 2, trained)).await.expect("create");
        }

        let page = repo
            .list(&SkillListQuery {
                trained_only: Some(false),
                limit: Some(1),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(page.total, 2);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].name, "Hide");

        let page = repo
            .list(&SkillListQuery {
                name: Some("umb".into()),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(page.results[0].name, "Tumble");
    }
}
