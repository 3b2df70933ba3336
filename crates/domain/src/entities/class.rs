//! Character classes and their shared class features.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ClassId;
use crate::value_objects::Slug;

/// A character class (Fighter, Wizard, prestige classes...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: ClassId,
    pub name: String,
    pub abbreviation: String,
    pub edition_id: Option<i64>,
    pub is_prestige: bool,
    pub is_visible: bool,
    pub can_cast_spells: bool,
    /// Hit die size, e.g. 8 for d8
    pub hit_die: i64,
    /// Skill points per level before the Intelligence modifier
    pub skill_points: i64,
    pub casting_ability_id: Option<i64>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Features granted by level. Only populated on single-class reads.
    #[serde(default)]
    pub features: Vec<ClassFeatureGrant>,
}

/// A class feature granted at a given class level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeatureGrant {
    pub feature_slug: Slug,
    pub feature_name: String,
    pub level: i64,
}

/// A reusable block of class rules text, shared by every class that grants it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeature {
    pub slug: Slug,
    pub name: String,
    pub description: Option<String>,
}
