//! Static reference data: editions, abilities, schools, and the like.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Which lookup list an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupKind {
    Editions,
    Abilities,
    Alignments,
    Sizes,
    Languages,
    Schools,
    Subschools,
    Descriptors,
    Components,
    Ranges,
    FeatTypes,
    FeatBenefitTypes,
    FeatPrerequisiteTypes,
}

impl LookupKind {
    pub const ALL: [LookupKind; 13] = [
        Self::Editions,
        Self::Abilities,
        Self::Alignments,
        Self::Sizes,
        Self::Languages,
        Self::Schools,
        Self::Subschools,
        Self::Descriptors,
        Self::Components,
        Self::Ranges,
        Self::FeatTypes,
        Self::FeatBenefitTypes,
        Self::FeatPrerequisiteTypes,
    ];

    /// Stable storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editions => "editions",
            Self::Abilities => "abilities",
            Self::Alignments => "alignments",
            Self::Sizes => "sizes",
            Self::Languages => "languages",
            Self::Schools => "schools",
            Self::Subschools => "subschools",
            Self::Descriptors => "descriptors",
            Self::Components => "components",
            Self::Ranges => "ranges",
            Self::FeatTypes => "featTypes",
            Self::FeatBenefitTypes => "featBenefitTypes",
            Self::FeatPrerequisiteTypes => "featPrerequisiteTypes",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LookupKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown lookup kind: {}", s)))
    }
}

/// One row of a lookup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntry {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

/// An `{id, name}` pair used for select lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedRef {
    pub id: i64,
    pub name: String,
}
