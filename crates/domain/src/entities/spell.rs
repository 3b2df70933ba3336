//! Spell entity.

use serde::{Deserialize, Serialize};

use crate::ids::{ClassId, SpellId};

/// A spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spell {
    pub id: SpellId,
    pub name: String,
    pub edition_id: Option<i64>,
    /// Lowest level at which any class casts the spell
    pub base_level: i64,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub casting_time: Option<String>,
    pub range: Option<String>,
    pub range_type_id: Option<i64>,
    pub range_value: Option<String>,
    pub area: Option<String>,
    pub duration: Option<String>,
    pub saving_throw: Option<String>,
    pub spell_resistance: Option<String>,
    pub effect: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub school_ids: Vec<i64>,
    #[serde(default)]
    pub subschool_ids: Vec<i64>,
    #[serde(default)]
    pub descriptor_ids: Vec<i64>,
    #[serde(default)]
    pub component_ids: Vec<i64>,
    #[serde(default)]
    pub levels: Vec<SpellClassLevel>,
}

/// The level at which one class casts a spell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellClassLevel {
    pub class_id: ClassId,
    pub class_name: String,
    pub class_abbreviation: String,
    pub level: i64,
    pub is_visible: bool,
}
