//! Grimoire domain: entities, typed IDs and value objects for the rules
//! reference. Nothing in here touches I/O.

pub mod entities;
pub mod error;
pub mod ids;
pub mod seed;
pub mod value_objects;

pub use entities::{
    Character, Class, ClassFeature, ClassFeatureGrant, ColumnAlignment, EntityKind, EntityLink,
    Feat, FeatEffect, LinkTarget, LookupEntry, LookupKind, NamedRef, NewUser, Race,
    RaceAbilityAdjustment, RaceLanguage, RaceTrait, RaceTraitGrant, ReferenceTable,
    ReferenceTableCell, ReferenceTableColumn, ReferenceTableData, ReferenceTableRow,
    ReferenceTableSummary, Skill, Spell, SpellClassLevel, StoredRow, User,
};
pub use error::DomainError;
pub use ids::{CharacterId, ClassId, FeatId, RaceId, SkillId, SpellId, UserId};
pub use value_objects::{
    editions_matching, Page, PageRequest, Slug, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT,
};
