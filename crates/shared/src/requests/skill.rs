use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/skills` and `PUT /api/skills/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SkillRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(range(min = 1, max = 6, message = "Invalid ability"))]
    pub ability_id: i64,
    #[serde(default)]
    pub trained_only: bool,
    #[serde(default)]
    pub affected_by_armor: bool,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 10000))]
    pub check_description: Option<String>,
    #[validate(length(max = 10000))]
    pub action_description: Option<String>,
    pub retry_type_id: Option<i64>,
    #[validate(length(max = 10000))]
    pub retry_description: Option<String>,
    #[validate(length(max = 10000))]
    pub special_notes: Option<String>,
    #[validate(length(max = 10000))]
    pub synergy_notes: Option<String>,
    #[validate(length(max = 10000))]
    pub untrained_notes: Option<String>,
}
