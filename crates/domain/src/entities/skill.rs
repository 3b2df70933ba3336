use serde::{Deserialize, Serialize};

use crate::ids::SkillId;

/// A skill (Hide, Spellcraft, Tumble...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    /// Key ability
    pub ability_id: i64,
    pub trained_only: bool,
    /// Whether the armor check penalty applies
    pub affected_by_armor: bool,
    pub description: Option<String>,
    pub check_description: Option<String>,
    pub action_description: Option<String>,
    pub retry_type_id: Option<i64>,
    pub retry_description: Option<String>,
    pub special_notes: Option<String>,
    pub synergy_notes: Option<String>,
    pub untrained_notes: Option<String>,
}
