//! Management use cases for CRUD-style operations.
//!
//! These keep HTTP handlers thin: handlers validate bodies and map errors,
//! the cruds here own lookups, ownership checks and logging.

mod character;
mod class;
mod class_feature;
mod feat;
mod race;
mod race_trait;
mod reference_table;
mod skill;
mod spell;

use grimoire_domain::{DomainError, Slug};

use crate::infrastructure::ports::RepoError;

pub use character::{Actor, CharacterCrud};
pub use class::ClassCrud;
pub use class_feature::ClassFeatureCrud;
pub use feat::FeatCrud;
pub use race::RaceCrud;
pub use race_trait::RaceTraitCrud;
pub use reference_table::ReferenceTableCrud;
pub use skill::SkillCrud;
pub use spell::SpellCrud;

/// Shared error type for management use cases.
#[derive(Debug, thiserror::Error)]
pub enum ManagementError {
    #[error("Not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Repository error: {0}")]
    Repo(RepoError),
}

impl From<RepoError> for ManagementError {
    fn from(e: RepoError) -> Self {
        if e.is_not_found() {
            Self::NotFound
        } else {
            Self::Repo(e)
        }
    }
}

impl From<DomainError> for ManagementError {
    fn from(e: DomainError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Parse a slug taken from a path. A malformed slug can't name a stored row,
/// so it reads as not found.
pub(crate) fn path_slug(raw: &str) -> Result<Slug, ManagementError> {
    Slug::new(raw).map_err(|_| ManagementError::NotFound)
}

/// Container for management use cases.
pub struct ManagementUseCases {
    pub class: ClassCrud,
    pub class_feature: ClassFeatureCrud,
    pub race: RaceCrud,
    pub race_trait: RaceTraitCrud,
    pub skill: SkillCrud,
    pub feat: FeatCrud,
    pub spell: SpellCrud,
    pub character: CharacterCrud,
    pub reference_table: ReferenceTableCrud,
}

impl ManagementUseCases {
    pub fn new(
        class: ClassCrud,
        class_feature: ClassFeatureCrud,
        race: RaceCrud,
        race_trait: RaceTraitCrud,
        skill: SkillCrud,
        feat: FeatCrud,
        spell: SpellCrud,
        character: CharacterCrud,
        reference_table: ReferenceTableCrud,
    ) -> Self {
        Self {
            class,
            class_feature,
            race,
            race_trait,
            skill,
            feat,
            spell,
            character,
            reference_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_map_to_not_found() {
        let err: ManagementError = RepoError::not_found("Spell", 3).into();
        assert!(matches!(err, ManagementError::NotFound));

        let err: ManagementError = RepoError::conflict("name").into();
        assert!(matches!(err, ManagementError::Repo(RepoError::Conflict(_))));
    }

    #[test]
    fn malformed_path_slugs_are_not_found() {
        assert!(matches!(path_slug("Bad Slug"), Err(ManagementError::NotFound)));
        assert_eq!(path_slug("12").expect("slug").as_str(), "12");
    }
}
