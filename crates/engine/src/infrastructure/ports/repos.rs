//! Repository port traits for database access.
//!
//! Write operations take the validated request bodies from `grimoire-shared`
//! as their input model. Updates and deletes of missing rows return
//! [`RepoError::NotFound`].

use async_trait::async_trait;
use grimoire_domain::{
    Character, CharacterId, Class, ClassFeature, ClassId, EntityKind, EntityLink, Feat, FeatId,
    LookupEntry, LookupKind, NamedRef, NewUser, Page, Race, RaceId, RaceTrait,
    ReferenceTableData, ReferenceTableSummary, Skill, SkillId, Slug, Spell, SpellId, User, UserId,
};
use grimoire_shared::{
    CharacterListQuery, CharacterRequest, ClassFeatureListQuery, ClassFeatureRequest,
    ClassListQuery, ClassRequest, FeatListQuery, FeatRequest, RaceListQuery, RaceRequest,
    RaceTraitListQuery, RaceTraitRequest, ReferenceTableListQuery, ReferenceTableRequest,
    SkillListQuery, SkillRequest, SpellListFilters, SpellListQuery, SpellRequest,
};

use super::error::RepoError;

// =============================================================================
// Accounts
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: UserId) -> Result<Option<User>, RepoError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
    async fn exists_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, RepoError>;
    async fn create(&self, user: &NewUser) -> Result<UserId, RepoError>;
    async fn set_preferred_edition(
        &self,
        id: UserId,
        edition_id: Option<i64>,
    ) -> Result<(), RepoError>;
    async fn set_admin(&self, id: UserId, is_admin: bool) -> Result<(), RepoError>;
}

// =============================================================================
// Catalog (one port per entity type)
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassRepo: Send + Sync {
    async fn list(&self, query: &ClassListQuery) -> Result<Page<Class>, RepoError>;
    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError>;
    async fn get(&self, id: ClassId) -> Result<Option<Class>, RepoError>;
    async fn create(&self, class: &ClassRequest) -> Result<ClassId, RepoError>;
    async fn update(&self, id: ClassId, class: &ClassRequest) -> Result<(), RepoError>;
    async fn delete(&self, id: ClassId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassFeatureRepo: Send + Sync {
    async fn list(&self, query: &ClassFeatureListQuery) -> Result<Page<ClassFeature>, RepoError>;
    async fn list_all(&self) -> Result<Vec<ClassFeature>, RepoError>;
    async fn get(&self, slug: &Slug) -> Result<Option<ClassFeature>, RepoError>;
    async fn create(&self, feature: &ClassFeatureRequest) -> Result<(), RepoError>;
    async fn update(&self, slug: &Slug, feature: &ClassFeatureRequest) -> Result<(), RepoError>;
    async fn delete(&self, slug: &Slug) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RaceRepo: Send + Sync {
    async fn list(&self, query: &RaceListQuery) -> Result<Page<Race>, RepoError>;
    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError>;
    async fn get(&self, id: RaceId) -> Result<Option<Race>, RepoError>;
    async fn create(&self, race: &RaceRequest) -> Result<RaceId, RepoError>;
    async fn update(&self, id: RaceId, race: &RaceRequest) -> Result<(), RepoError>;
    async fn delete(&self, id: RaceId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RaceTraitRepo: Send + Sync {
    async fn list(&self, query: &RaceTraitListQuery) -> Result<Page<RaceTrait>, RepoError>;
    async fn list_all(&self) -> Result<Vec<RaceTrait>, RepoError>;
    async fn get(&self, slug: &Slug) -> Result<Option<RaceTrait>, RepoError>;
    async fn create(&self, race_trait: &RaceTraitRequest) -> Result<(), RepoError>;
    async fn update(&self, slug: &Slug, race_trait: &RaceTraitRequest) -> Result<(), RepoError>;
    async fn delete(&self, slug: &Slug) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SkillRepo: Send + Sync {
    async fn list(&self, query: &SkillListQuery) -> Result<Page<Skill>, RepoError>;
    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError>;
    async fn get(&self, id: SkillId) -> Result<Option<Skill>, RepoError>;
    async fn create(&self, skill: &SkillRequest) -> Result<SkillId, RepoError>;
    async fn update(&self, id: SkillId, skill: &SkillRequest) -> Result<(), RepoError>;
    async fn delete(&self, id: SkillId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeatRepo: Send + Sync {
    async fn list(&self, query: &FeatListQuery) -> Result<Page<Feat>, RepoError>;
    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError>;
    async fn get(&self, id: FeatId) -> Result<Option<Feat>, RepoError>;
    async fn create(&self, feat: &FeatRequest) -> Result<FeatId, RepoError>;
    async fn update(&self, id: FeatId, feat: &FeatRequest) -> Result<(), RepoError>;
    async fn delete(&self, id: FeatId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpellRepo: Send + Sync {
    async fn list(
        &self,
        query: &SpellListQuery,
        filters: &SpellListFilters,
    ) -> Result<Page<Spell>, RepoError>;
    async fn list_names(&self) -> Result<Vec<NamedRef>, RepoError>;
    async fn get(&self, id: SpellId) -> Result<Option<Spell>, RepoError>;
    async fn create(&self, spell: &SpellRequest) -> Result<SpellId, RepoError>;
    async fn update(&self, id: SpellId, spell: &SpellRequest) -> Result<(), RepoError>;
    async fn delete(&self, id: SpellId) -> Result<(), RepoError>;
}

// =============================================================================
// User content
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn list(&self, query: &CharacterListQuery) -> Result<Page<Character>, RepoError>;
    async fn get(&self, id: CharacterId) -> Result<Option<Character>, RepoError>;
    async fn create(
        &self,
        owner: UserId,
        character: &CharacterRequest,
    ) -> Result<CharacterId, RepoError>;
    /// Replaces every field, including the owner.
    async fn update(
        &self,
        id: CharacterId,
        owner: UserId,
        character: &CharacterRequest,
    ) -> Result<(), RepoError>;
    async fn delete(&self, id: CharacterId) -> Result<(), RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceTableRepo: Send + Sync {
    async fn list(
        &self,
        query: &ReferenceTableListQuery,
    ) -> Result<Page<ReferenceTableSummary>, RepoError>;
    async fn get(&self, slug: &Slug) -> Result<Option<ReferenceTableData>, RepoError>;
    /// Tables for every slug that exists; missing slugs are skipped.
    async fn get_many(&self, slugs: &[Slug]) -> Result<Vec<ReferenceTableData>, RepoError>;
    async fn create(&self, table: &ReferenceTableRequest) -> Result<(), RepoError>;
    /// Replaces the table's fields, columns, rows and cells.
    async fn update(&self, slug: &Slug, table: &ReferenceTableRequest) -> Result<(), RepoError>;
    async fn delete(&self, slug: &Slug) -> Result<(), RepoError>;
}

// =============================================================================
// Reference data and resolution
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LookupRepo: Send + Sync {
    async fn load_all(&self) -> Result<Vec<(LookupKind, LookupEntry)>, RepoError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntityLookupRepo: Send + Sync {
    /// Find entities of `kind` whose name (or slug, for slug-keyed kinds)
    /// matches one of `keys`, case-insensitively. `keys` are lowercase.
    ///
    /// Reference tables are not links and always come back empty here.
    async fn find_links(
        &self,
        kind: EntityKind,
        keys: &[String],
    ) -> Result<Vec<EntityLink>, RepoError>;
}
