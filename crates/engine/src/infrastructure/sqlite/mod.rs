//! SQLite persistence.
//!
//! One repository per port, all sharing a single pool. The schema is created
//! on startup with `CREATE TABLE IF NOT EXISTS` and the built-in lookup lists
//! are seeded with `INSERT OR IGNORE`.

mod characters;
mod classes;
mod entity_lookup;
mod feats;
mod lookups;
mod query;
mod races;
mod reference_tables;
mod skills;
mod spells;
mod users;

use std::str::FromStr;
use std::sync::Arc;

use grimoire_domain::seed::seed_entries;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::infrastructure::ports::ClockPort;

pub use characters::SqliteCharacterRepo;
pub use classes::{SqliteClassFeatureRepo, SqliteClassRepo};
pub use entity_lookup::SqliteEntityLookupRepo;
pub use feats::SqliteFeatRepo;
pub use lookups::SqliteLookupRepo;
pub use races::{SqliteRaceRepo, SqliteRaceTraitRepo};
pub use reference_tables::SqliteReferenceTableRepo;
pub use skills::SqliteSkillRepo;
pub use spells::SqliteSpellRepo;
pub use users::SqliteUserRepo;

/// Every SQLite repository, sharing one pool.
#[derive(Clone)]
pub struct SqliteRepositories {
    pub user: Arc<SqliteUserRepo>,
    pub class: Arc<SqliteClassRepo>,
    pub class_feature: Arc<SqliteClassFeatureRepo>,
    pub race: Arc<SqliteRaceRepo>,
    pub race_trait: Arc<SqliteRaceTraitRepo>,
    pub skill: Arc<SqliteSkillRepo>,
    pub feat: Arc<SqliteFeatRepo>,
    pub spell: Arc<SqliteSpellRepo>,
    pub character: Arc<SqliteCharacterRepo>,
    pub reference_table: Arc<SqliteReferenceTableRepo>,
    pub lookup: Arc<SqliteLookupRepo>,
    pub entity_lookup: Arc<SqliteEntityLookupRepo>,
}

impl SqliteRepositories {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            user: Arc::new(SqliteUserRepo::new(pool.clone(), clock.clone())),
            class: Arc::new(SqliteClassRepo::new(pool.clone(), clock.clone())),
            class_feature: Arc::new(SqliteClassFeatureRepo::new(pool.clone())),
            race: Arc::new(SqliteRaceRepo::new(pool.clone())),
            race_trait: Arc::new(SqliteRaceTraitRepo::new(pool.clone())),
            skill: Arc::new(SqliteSkillRepo::new(pool.clone())),
            feat: Arc::new(SqliteFeatRepo::new(pool.clone())),
            spell: Arc::new(SqliteSpellRepo::new(pool.clone())),
            character: Arc::new(SqliteCharacterRepo::new(pool.clone(), clock.clone())),
            reference_table: Arc::new(SqliteReferenceTableRepo::new(pool.clone(), clock)),
            lookup: Arc::new(SqliteLookupRepo::new(pool.clone())),
            entity_lookup: Arc::new(SqliteEntityLookupRepo::new(pool)),
        }
    }
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        is_admin INTEGER NOT NULL DEFAULT 0,
        preferred_edition_id INTEGER,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS lookups (
        kind TEXT NOT NULL,
        id INTEGER NOT NULL,
        name TEXT NOT NULL,
        abbreviation TEXT,
        PRIMARY KEY (kind, id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS classes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL DEFAULT '',
        abbreviation TEXT NOT NULL,
        edition_id INTEGER,
        is_prestige INTEGER NOT NULL DEFAULT 0,
        is_visible INTEGER NOT NULL DEFAULT 1,
        can_cast_spells INTEGER NOT NULL DEFAULT 0,
        hit_die INTEGER NOT NULL,
        skill_points INTEGER NOT NULL,
        casting_ability_id INTEGER,
        description TEXT,
        created_at TEXT NOT NULL,
        UNIQUE (name, edition_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS class_features (
        slug TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS class_feature_grants (
        class_id INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
        feature_slug TEXT NOT NULL REFERENCES class_features(slug) ON UPDATE CASCADE,
        level INTEGER NOT NULL,
        PRIMARY KEY (class_id, feature_slug, level)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS races (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL DEFAULT '',
        description TEXT,
        size_id INTEGER,
        speed INTEGER NOT NULL,
        favored_class_id INTEGER NOT NULL DEFAULT 0,
        edition_id INTEGER,
        is_visible INTEGER NOT NULL DEFAULT 1,
        UNIQUE (name, edition_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS race_traits (
        slug TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        has_value INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS race_languages (
        race_id INTEGER NOT NULL REFERENCES races(id) ON DELETE CASCADE,
        language_id INTEGER NOT NULL,
        is_automatic INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (race_id, language_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS race_ability_adjustments (
        race_id INTEGER NOT NULL REFERENCES races(id) ON DELETE CASCADE,
        ability_id INTEGER NOT NULL,
        value INTEGER NOT NULL,
        PRIMARY KEY (race_id, ability_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS race_trait_grants (
        race_id INTEGER NOT NULL REFERENCES races(id) ON DELETE CASCADE,
        trait_slug TEXT NOT NULL REFERENCES race_traits(slug) ON UPDATE CASCADE,
        value TEXT,
        PRIMARY KEY (race_id, trait_slug)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS skills (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        name_key TEXT NOT NULL DEFAULT '',
        ability_id INTEGER NOT NULL,
        trained_only INTEGER NOT NULL DEFAULT 0,
        affected_by_armor INTEGER NOT NULL DEFAULT 0,
        description TEXT,
        check_description TEXT,
        action_description TEXT,
        retry_type_id INTEGER,
        retry_description TEXT,
        special_notes TEXT,
        synergy_notes TEXT,
        untrained_notes TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feats (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        name_key TEXT NOT NULL DEFAULT '',
        type_id INTEGER,
        description TEXT,
        benefit TEXT,
        normal_effect TEXT,
        special_effect TEXT,
        prerequisites TEXT,
        repeatable INTEGER NOT NULL DEFAULT 0,
        fighter_bonus INTEGER NOT NULL DEFAULT 0
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feat_benefits (
        feat_id INTEGER NOT NULL REFERENCES feats(id) ON DELETE CASCADE,
        effect_index INTEGER NOT NULL,
        type_id INTEGER NOT NULL,
        reference_id INTEGER,
        amount INTEGER,
        PRIMARY KEY (feat_id, effect_index)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS feat_prereqs (
        feat_id INTEGER NOT NULL REFERENCES feats(id) ON DELETE CASCADE,
        effect_index INTEGER NOT NULL,
        type_id INTEGER NOT NULL,
        reference_id INTEGER,
        amount INTEGER,
        PRIMARY KEY (feat_id, effect_index)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spells (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL DEFAULT '',
        edition_id INTEGER,
        base_level INTEGER NOT NULL DEFAULT 0,
        summary TEXT,
        description TEXT,
        casting_time TEXT,
        range_text TEXT,
        range_type_id INTEGER,
        range_value TEXT,
        area TEXT,
        duration TEXT,
        saving_throw TEXT,
        spell_resistance TEXT,
        effect TEXT,
        target TEXT,
        UNIQUE (name, edition_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_schools (
        spell_id INTEGER NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        school_id INTEGER NOT NULL,
        PRIMARY KEY (spell_id, school_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_subschools (
        spell_id INTEGER NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        subschool_id INTEGER NOT NULL,
        PRIMARY KEY (spell_id, subschool_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_descriptors (
        spell_id INTEGER NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        descriptor_id INTEGER NOT NULL,
        PRIMARY KEY (spell_id, descriptor_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_components (
        spell_id INTEGER NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        component_id INTEGER NOT NULL,
        PRIMARY KEY (spell_id, component_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS spell_class_levels (
        spell_id INTEGER NOT NULL REFERENCES spells(id) ON DELETE CASCADE,
        class_id INTEGER NOT NULL REFERENCES classes(id) ON DELETE CASCADE,
        level INTEGER NOT NULL,
        is_visible INTEGER NOT NULL DEFAULT 1,
        PRIMARY KEY (spell_id, class_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS characters (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        name_key TEXT NOT NULL DEFAULT '',
        race_id INTEGER NOT NULL REFERENCES races(id),
        alignment_id INTEGER NOT NULL,
        age INTEGER,
        height INTEGER,
        weight INTEGER,
        eyes TEXT,
        hair TEXT,
        gender TEXT,
        notes TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reference_tables (
        slug TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        description TEXT,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reference_table_columns (
        table_slug TEXT NOT NULL
            REFERENCES reference_tables(slug) ON DELETE CASCADE ON UPDATE CASCADE,
        column_index INTEGER NOT NULL,
        header TEXT NOT NULL,
        span INTEGER NOT NULL DEFAULT 1,
        alignment TEXT NOT NULL DEFAULT 'left',
        PRIMARY KEY (table_slug, column_index)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reference_table_rows (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        table_slug TEXT NOT NULL
            REFERENCES reference_tables(slug) ON DELETE CASCADE ON UPDATE CASCADE,
        row_index INTEGER NOT NULL,
        label TEXT,
        UNIQUE (table_slug, row_index)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS reference_table_cells (
        row_id INTEGER NOT NULL REFERENCES reference_table_rows(id) ON DELETE CASCADE,
        column_index INTEGER NOT NULL,
        value TEXT NOT NULL,
        col_span INTEGER NOT NULL DEFAULT 1,
        row_span INTEGER NOT NULL DEFAULT 1,
        PRIMARY KEY (row_id, column_index)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_characters_user ON characters(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_spell_class_levels_class ON spell_class_levels(class_id, level)",
    "CREATE INDEX IF NOT EXISTS idx_race_trait_grants_slug ON race_trait_grants(trait_slug)",
    "CREATE INDEX IF NOT EXISTS idx_class_feature_grants_slug ON class_feature_grants(feature_slug)",
    "CREATE INDEX IF NOT EXISTS idx_classes_name_key ON classes(name_key)",
    "CREATE INDEX IF NOT EXISTS idx_races_name_key ON races(name_key)",
    "CREATE INDEX IF NOT EXISTS idx_skills_name_key ON skills(name_key)",
    "CREATE INDEX IF NOT EXISTS idx_feats_name_key ON feats(name_key)",
    "CREATE INDEX IF NOT EXISTS idx_spells_name_key ON spells(name_key)",
    "CREATE INDEX IF NOT EXISTS idx_characters_name_key ON characters(name_key)",
];

/// Open a pool with foreign keys enforced.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .foreign_keys(true)
        .create_if_missing(true);

    // An in-memory database lives and dies with its connection, so it must
    // never be dropped or replaced.
    let in_memory = database_url.contains(":memory:");
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(8)
    };

    pool_options.connect_with(options).await
}

/// Create every table and seed the built-in lookup lists.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    let mut tx = pool.begin().await?;
    let mut seeded = 0u64;
    for (kind, entry) in seed_entries() {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO lookups (kind, id, name, abbreviation) VALUES (?, ?, ?, ?)",
        )
        .bind(kind.as_str())
        .bind(entry.id)
        .bind(&entry.name)
        .bind(&entry.abbreviation)
        .execute(&mut *tx)
        .await?;
        seeded += result.rows_affected();
    }
    tx.commit().await?;

    tracing::info!(tables = SCHEMA.len(), seeded, "Database schema ready");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn schema_is_idempotent_and_seeds_lookups() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("grimoire.db").display());

        let pool = connect(&url).await.expect("connect");
        init_schema(&pool).await.expect("first init");
        init_schema(&pool).await.expect("second init");

        let editions: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM lookups WHERE kind = 'editions'")
                .fetch_one(&pool)
                .await
                .expect("count");
        assert_eq!(editions, 7);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = testing::pool().await;
        let result = sqlx::query(
            "INSERT INTO class_feature_grants (class_id, feature_slug, level) VALUES (99, 'nope', 1)",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
