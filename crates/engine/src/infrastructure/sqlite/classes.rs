use std::sync::Arc;

use async_trait::async_trait;
use grimoire_domain::{Class, ClassFeature, ClassFeatureGrant, ClassId, NamedRef, Page, Slug};
use grimoire_shared::{ClassFeatureListQuery, ClassFeatureRequest, ClassListQuery, ClassRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::query::{db_err, name_key, order_by, push_contains, push_eq, push_page, slug_column};
use crate::infrastructure::ports::{ClassFeatureRepo, ClassRepo, ClockPort, RepoError};

const CLASS_COLUMNS: &str = "c.id, c.name, c.abbreviation, c.edition_id, c.is_prestige, \
                             c.is_visible, c.can_cast_spells, c.hit_die, c.skill_points, \
                             c.casting_ability_id, c.description, c.created_at";

const CLASS_SORTS: &[(&str, &str)] = &[
    ("name", "c.name"),
    ("createdAt", "c.created_at"),
    ("hitDie", "c.hit_die"),
];

const FEATURE_SORTS: &[(&str, &str)] = &[("name", "f.name"), ("slug", "f.slug")];

// =============================================================================
// Classes
// =============================================================================

pub struct SqliteClassRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteClassRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ClassListQuery) {
        push_contains(builder, "c.name", query.name.as_deref());
        push_eq(builder, "c.edition_id", query.edition_id);
        push_eq(builder, "c.is_prestige", query.is_prestige);
        push_eq(builder, "c.is_visible", query.is_visible);
        push_eq(builder, "c.can_cast_spells", query.can_cast_spells);
        push_eq(builder, "c.hit_die", query.hit_die);
    }

    fn row_to_class(row: &SqliteRow) -> Result<Class, sqlx::Error> {
        Ok(Class {
            id: ClassId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            abbreviation: row.try_get("abbreviation")?,
            edition_id: row.try_get("edition_id")?,
            is_prestige: row.try_get("is_prestige")?,
            is_visible: row.try_get("is_visible")?,
            can_cast_spells: row.try_get("can_cast_spells")?,
            hit_die: row.try_get("hit_die")?,
            skill_points: row.try_get("skill_points")?,
            casting_ability_id: row.try_get("casting_ability_id")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
            features: Vec::new(),
        })
    }

    async fn replace_features(
        conn: &mut SqliteConnection,
        id: ClassId,
        class: &ClassRequest,
    ) -> Result<(), sqlx::Error> {
        let Some(features) = &class.features else {
            return Ok(());
        };
        sqlx::query("DELETE FROM class_feature_grants WHERE class_id = ?")
            .bind(id.get())
            .execute(&mut *conn)
            .await?;
        for grant in features {
            sqlx::query(
                "INSERT INTO class_feature_grants (class_id, feature_slug, level) VALUES (?, ?, ?)",
            )
            .bind(id.get())
            .bind(grant.feature_slug.as_str())
            .bind(grant.level)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ClassRepo for SqliteClassRepo {
    async fn list(&self, query: &ClassListQuery) -> Result<Page<Class>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM classes c WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_classes"))?;

        let mut select =
            QueryBuilder::new(format!("SELECT {} FROM classes c WHERE 1=1", CLASS_COLUMNS));
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            CLASS_SORTS,
            query.sort_order(),
            "c.id",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_classes"))?;
        let classes = rows
            .iter()
            .map(Self::row_to_class)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_classes"))?;

        Ok(Page::new(page, total, classes))
    }

    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM classes ORDER BY name, id")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err("list_class_names"))?;
        Ok(rows
            .into_iter()
            .map(|(id, name)| NamedRef { id, name })
            .collect())
    }

    async fn get(&self, id: ClassId) -> Result<Option<Class>, RepoError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM classes c WHERE c.id = ?",
            CLASS_COLUMNS
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("get_class"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut class = Self::row_to_class(&row).map_err(db_err("get_class"))?;

        let grants = sqlx::query(
            r#"
            SELECT g.feature_slug, f.name, g.level
            FROM class_feature_grants g
            JOIN class_features f ON f.slug = g.feature_slug
            WHERE g.class_id = ?
            ORDER BY g.level, f.name
            "#,
        )
        .bind(id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("get_class_features"))?;

        class.features = grants
            .iter()
            .map(|row| -> Result<ClassFeatureGrant, sqlx::Error> {
                Ok(ClassFeatureGrant {
                    feature_slug: slug_column(row, "feature_slug")?,
                    feature_name: row.try_get("name")?,
                    level: row.try_get("level")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("get_class_features"))?;

        Ok(Some(class))
    }

    async fn create(&self, class: &ClassRequest) -> Result<ClassId, RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("create_class"))?;

        let result = sqlx::query(
            r#"
            INSERT INTO classes (name, name_key, abbreviation, edition_id, is_prestige, is_visible,
                                 can_cast_spells, hit_die, skill_points, casting_ability_id,
                                 description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&class.name)
        .bind(name_key(&class.name))
        .bind(&class.abbreviation)
        .bind(class.edition_id)
        .bind(class.is_prestige)
        .bind(class.is_visible)
        .bind(class.can_cast_spells)
        .bind(class.hit_die)
        .bind(class.skill_points)
        .bind(class.casting_ability_id)
        .bind(&class.description)
        .bind(self.clock.now())
        .execute(&mut *tx)
        .await
        .map_err(db_err("create_class"))?;
        let id = ClassId::new(result.last_insert_rowid());

        Self::replace_features(&mut tx, id, class)
            .await
            .map_err(db_err("create_class_features"))?;
        tx.commit().await.map_err(db_err("create_class"))?;

        Ok(id)
    }

    async fn update(&self, id: ClassId, class: &ClassRequest) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await.map_err(db_err("update_class"))?;

        let result = sqlx::query(
            r#"
            UPDATE classes
            SET name = ?, name_key = ?, abbreviation = ?, edition_id = ?, is_prestige = ?, is_visible = ?,
                can_cast_spells = ?, hit_die = ?, skill_points = ?, casting_ability_id = ?,
                description = ?
            WHERE id = ?
            "#,
        )
        .bind(&class.name)
        .bind(name_key(&class.name))
        .bind(&class.abbreviation)
        .bind(class.edition_id)
        .bind(class.is_prestige)
        .bind(class.is_visible)
        .bind(class.can_cast_spells)
        .bind(class.hit_die)
        .bind(class.skill_points)
        .bind(class.casting_ability_id)
        .bind(&class.description)
        .bind(id.get())
        .execute(&mut *tx)
        .await
        .map_err(db_err("update_class"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Class", id));
        }

        Self::replace_features(&mut tx, id, class)
            .await
            .map_err(db_err("update_class_features"))?;
        tx.commit().await.map_err(db_err("update_class"))?;
        Ok(())
    }

    async fn delete(&self, id: ClassId) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM classes WHERE id = ?")
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_class"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("Class", id));
        }
        Ok(())
    }
}

// =============================================================================
// Class features
// =============================================================================

pub struct SqliteClassFeatureRepo {
    pool: SqlitePool,
}

impl SqliteClassFeatureRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ClassFeatureListQuery) {
        push_contains(builder, "f.slug", query.slug.as_deref());
        push_contains(builder, "f.name", query.name.as_deref());
    }

    fn row_to_feature(row: &SqliteRow) -> Result<ClassFeature, sqlx::Error> {
        Ok(ClassFeature {
            slug: slug_column(row, "slug")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }
}

#[async_trait]
impl ClassFeatureRepo for SqliteClassFeatureRepo {
    async fn list(&self, query: &ClassFeatureListQuery) -> Result<Page<ClassFeature>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM class_features f WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_class_features"))?;

        let mut select = QueryBuilder::new(
            "SELECT f.slug, f.name, f.description FROM class_features f WHERE 1=1",
        );
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            FEATURE_SORTS,
            query.sort_order(),
            "f.slug",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_class_features"))?;
        let features = rows
            .iter()
            .map(Self::row_to_feature)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_class_features"))?;

        Ok(Page::new(page, total, features))
    }

    async fn list_all(&self) -> Result<Vec<ClassFeature>, RepoError> {
        let rows = sqlx::query("SELECT slug, name, description FROM class_features ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_all_class_features"))?;
        rows.iter()
            .map(Self::row_to_feature)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_all_class_features"))
    }

    async fn get(&self, slug: &Slug) -> Result<Option<ClassFeature>, RepoError> {
        let row = sqlx::query("SELECT slug, name, description FROM class_features WHERE slug = ?")
            .bind(slug.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err("get_class_feature"))?;
        row.as_ref()
            .map(Self::row_to_feature)
            .transpose()
            .map_err(db_err("get_class_feature"))
    }

    async fn create(&self, feature: &ClassFeatureRequest) -> Result<(), RepoError> {
        sqlx::query("INSERT INTO class_features (slug, name, description) VALUES (?, ?, ?)")
            .bind(feature.slug.as_str())
            .bind(&feature.name)
            .bind(&feature.description)
            .execute(&self.pool)
            .await
            .map_err(db_err("create_class_feature"))?;
        Ok(())
    }

    async fn update(&self, slug: &Slug, feature: &ClassFeatureRequest) -> Result<(), RepoError> {
        let result = sqlx::query(
            "UPDATE class_features SET slug = ?, name = ?, description = ? WHERE slug = ?",
        )
        .bind(feature.slug.as_str())
        .bind(&feature.name)
        .bind(&feature.description)
        .bind(slug.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_err("update_class_feature"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("ClassFeature", slug.as_str()));
        }
        Ok(())
    }

    async fn delete(&self, slug: &Slug) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM class_features WHERE slug = ?")
            .bind(slug.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_class_feature"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("ClassFeature", slug.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::testing;
    use grimoire_shared::ClassFeatureGrantRequest;

    fn slug(s: &str) -> Slug {
        Slug::new(s).expect("slug")
    }

    fn wizard(features: Option<Vec<ClassFeatureGrantRequest>>) -> ClassRequest {
        ClassRequest {
            name: "Wizard".into(),
            abbreviation: "Wiz".into(),
            edition_id: Some(5),
            is_prestige: false,
            is_visible: true,
            can_cast_spells: true,
            hit_die: 4,
            skill_points: 2,
            casting_ability_id: Some(4),
            description: None,
            features,
        }
    }

    fn feature(s: &str, name: &str) -> ClassFeatureRequest {
        ClassFeatureRequest {
            slug: slug(s),
            name: name.into(),
            description: Some("Rules text".into()),
        }
    }

    async fn repos() -> (SqliteClassRepo, SqliteClassFeatureRepo) {
        let pool = testing::pool().await;
        (
            SqliteClassRepo::new(pool.clone(), testing::clock()),
            SqliteClassFeatureRepo::new(pool),
        )
    }

    #[tokio::test]
    async fn class_round_trip_with_features() {
        let (classes, features) = repos().await;
        features
            .create(&feature("scribe-scroll", "Scribe Scroll"))
            .await
            .expect("feature");

        let id = classes
            .create(&wizard(Some(vec![ClassFeatureGrantRequest {
                feature_slug: slug("scribe-scroll"),
                level: 1,
            }])))
            .await
            .expect("create");

        let class = classes.get(id).await.expect("get").expect("exists");
        assert_eq!(class.name, "Wizard");
        assert_eq!(class.features.len(), 1);
        assert_eq!(class.features[0].feature_name, "Scribe Scroll");

        // Omitting the list on update leaves the grants alone.
        let mut renamed = wizard(None);
        renamed.abbreviation = "Wz".into();
        classes.update(id, &renamed).await.expect("update");
        let class = classes.get(id).await.expect("get").expect("exists");
        assert_eq!(class.abbreviation, "Wz");
        assert_eq!(class.features.len(), 1);

        classes.update(id, &wizard(Some(vec![]))).await.expect("clear");
        let class = classes.get(id).await.expect("get").expect("exists");
        assert!(class.features.is_empty());
    }

    #[tokio::test]
    async fn list_filters_sorts_and_counts() {
        let (classes, _) = repos().await;
        classes.create(&wizard(None)).await.expect("wizard");
        let mut fighter = wizard(None);
        fighter.name = "Fighter".into();
        fighter.abbreviation = "Ftr".into();
        fighter.hit_die = 10;
        fighter.can_cast_spells = false;
        classes.create(&fighter).await.expect("fighter");

        let page = classes
            .list(&ClassListQuery {
                can_cast_spells: Some(false),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].name, "Fighter");

        let page = classes
            .list(&ClassListQuery {
                sort: Some("hitDie".into()),
                order: Some(grimoire_domain::SortOrder::Desc),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(page.total, 2);
        assert_eq!(page.results[0].hit_die, 10);

        let names = classes.list_names().await.expect("names");
        assert_eq!(names[0].name, "Fighter");
    }

    #[tokio::test]
    async fn granted_features_cannot_be_deleted() {
        let (classes, features) = repos().await;
        features
            .create(&feature("bonus-feat", "Bonus Feat"))
            .await
            .expect("feature");
        classes
            .create(&wizard(Some(vec![ClassFeatureGrantRequest {
                feature_slug: slug("bonus-feat"),
                level: 5,
            }])))
            .await
            .expect("create");

        let err = features
            .delete(&slug("bonus-feat"))
            .await
            .expect_err("in use");
        assert!(matches!(err, RepoError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn renaming_a_feature_slug_follows_grants() {
        let (classes, features) = repos().await;
        features
            .create(&feature("arcane-bond", "Arcane Bond"))
            .await
            .expect("feature");
        let id = classes
            .create(&wizard(Some(vec![ClassFeatureGrantRequest {
                feature_slug: slug("arcane-bond"),
                level: 1,
            }])))
            .await
            .expect("create");

        features
            .update(&slug("arcane-bond"), &feature("bonded-object", "Bonded Object"))
            .await
            .expect("rename");

        let class = classes.get(id).await.expect("get").expect("exists");
        assert_eq!(class.features[0].feature_slug.as_str(), "bonded-object");
        assert!(features
            .get(&slug("arcane-bond"))
            .await
            .expect("get")
            .is_none());
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let (classes, features) = repos().await;
        assert!(classes
            .delete(ClassId::new(42))
            .await
            .is_err_and(|e| e.is_not_found()));
        assert!(features
            .update(&slug("nope"), &feature("nope", "Nope"))
            .await
            .is_err_and(|e| e.is_not_found()));
    }
}
