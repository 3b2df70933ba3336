//! Playable races and their shared racial traits.

use serde::{Deserialize, Serialize};

use crate::ids::RaceId;
use crate::value_objects::Slug;

/// A playable race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    pub description: Option<String>,
    pub size_id: Option<i64>,
    /// Base land speed in feet
    pub speed: i64,
    /// 0 means "any"
    pub favored_class_id: i64,
    pub edition_id: Option<i64>,
    pub is_visible: bool,
    #[serde(default)]
    pub languages: Vec<RaceLanguage>,
    #[serde(default)]
    pub adjustments: Vec<RaceAbilityAdjustment>,
    #[serde(default)]
    pub traits: Vec<RaceTraitGrant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceLanguage {
    pub language_id: i64,
    /// Automatic languages are always known; the rest are bonus choices.
    pub is_automatic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceAbilityAdjustment {
    pub ability_id: i64,
    pub value: i64,
}

/// A racial trait granted by a race, with the race-specific value if the
/// trait takes one (e.g. Darkvision "60 ft.").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceTraitGrant {
    pub trait_slug: Slug,
    pub trait_name: String,
    pub value: Option<String>,
}

/// A reusable block of racial rules text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceTrait {
    pub slug: Slug,
    pub name: String,
    pub description: Option<String>,
    /// Whether races granting this trait supply a value
    pub has_value: bool,
}
