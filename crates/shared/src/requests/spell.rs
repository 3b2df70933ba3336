use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Body of `POST /api/spells` and `PUT /api/spells/{id}`.
///
/// Each id list and `levels`, when present, replaces the stored mapping.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpellRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    pub edition_id: Option<i64>,
    #[validate(range(min = 0, max = 20, message = "Base level must be between 0 and 20"))]
    pub base_level: i64,
    #[validate(length(max = 1000))]
    pub summary: Option<String>,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    #[validate(length(max = 200))]
    pub casting_time: Option<String>,
    #[validate(length(max = 200))]
    pub range: Option<String>,
    pub range_type_id: Option<i64>,
    #[validate(length(max = 200))]
    pub range_value: Option<String>,
    #[validate(length(max = 500))]
    pub area: Option<String>,
    #[validate(length(max = 500))]
    pub duration: Option<String>,
    #[validate(length(max = 200))]
    pub saving_throw: Option<String>,
    #[validate(length(max = 200))]
    pub spell_resistance: Option<String>,
    #[validate(length(max = 500))]
    pub effect: Option<String>,
    #[validate(length(max = 500))]
    pub target: Option<String>,
    pub school_ids: Option<Vec<i64>>,
    pub subschool_ids: Option<Vec<i64>>,
    pub descriptor_ids: Option<Vec<i64>>,
    pub component_ids: Option<Vec<i64>>,
    #[validate(nested)]
    pub levels: Option<Vec<SpellLevelRequest>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SpellLevelRequest {
    #[validate(range(min = 1, message = "Invalid class"))]
    pub class_id: i64,
    #[validate(range(min = 0, max = 20, message = "Level must be between 0 and 20"))]
    pub level: i64,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}
