//! Cross-entity references embedded in rules text.
//!
//! Markdown can mention another entity by name, e.g. `{Spell: Fireball}` or
//! `{Trait: darkvision}`. This module names the kinds of entity that can be
//! referenced and the shape of a resolved reference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// The kind of entity a reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Spell,
    Feat,
    Skill,
    Class,
    Race,
    Character,
    /// Racial trait, looked up by slug
    Trait,
    /// Reference table, looked up by slug and embedded rather than linked
    ReferenceTable,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        Self::Spell,
        Self::Feat,
        Self::Skill,
        Self::Class,
        Self::Race,
        Self::Character,
        Self::Trait,
        Self::ReferenceTable,
    ];

    /// Canonical lowercase name, used as the key in resolution responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Spell => "spell",
            Self::Feat => "feat",
            Self::Skill => "skill",
            Self::Class => "class",
            Self::Race => "race",
            Self::Character => "character",
            Self::Trait => "trait",
            Self::ReferenceTable => "referencetable",
        }
    }

    /// Path prefix of the entity's page.
    pub fn route(&self) -> &'static str {
        match self {
            Self::Spell => "/spells",
            Self::Feat => "/feats",
            Self::Skill => "/skills",
            Self::Class => "/classes",
            Self::Race => "/races",
            Self::Character => "/characters",
            Self::Trait => "/races/traits",
            Self::ReferenceTable => "/referencetables",
        }
    }

    /// Whether references of this kind are keyed by slug instead of by name.
    pub fn is_slug_keyed(&self) -> bool {
        matches!(self, Self::Trait | Self::ReferenceTable)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = DomainError;

    /// Case-insensitive; singular and plural spellings are both accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "spell" | "spells" => Self::Spell,
            "feat" | "feats" => Self::Feat,
            "skill" | "skills" => Self::Skill,
            "class" | "classes" => Self::Class,
            "race" | "races" => Self::Race,
            "character" | "characters" => Self::Character,
            "trait" | "traits" | "racetrait" | "racetraits" => Self::Trait,
            "table" | "tables" | "referencetable" | "referencetables" => Self::ReferenceTable,
            _ => return Err(DomainError::parse(format!("Unknown entity type: {}", s))),
        };
        Ok(kind)
    }
}

/// Identifier of a resolved entity: numeric for catalog rows, a slug for
/// slug-keyed kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkTarget {
    Id(i64),
    Slug(String),
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{}", id),
            Self::Slug(slug) => f.write_str(slug),
        }
    }
}

/// A reference that resolved to a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityLink {
    pub id: LinkTarget,
    pub name: String,
}

impl EntityLink {
    /// The entity's page, e.g. `/spells/12`.
    pub fn href(&self, kind: EntityKind) -> String {
        format!("{}/{}", kind.route(), self.id)
    }
}
