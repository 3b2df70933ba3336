use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/feats` and `PUT /api/feats/{id}`.
///
/// `benefits` and `prereqs`, when present, replace the stored rows.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeatRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    pub type_id: Option<i64>,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(max = 10000))]
    pub benefit: Option<String>,
    #[validate(length(max = 10000))]
    pub normal_effect: Option<String>,
    #[validate(length(max = 10000))]
    pub special_effect: Option<String>,
    #[validate(length(max = 10000))]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub fighter_bonus: bool,
    #[validate(nested)]
    pub benefits: Option<Vec<FeatEffectRequest>>,
    #[validate(nested)]
    pub prereqs: Option<Vec<FeatEffectRequest>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeatEffectRequest {
    #[validate(range(min = 0))]
    pub index: i64,
    #[validate(range(min = 1, message = "Invalid type"))]
    pub type_id: i64,
    pub reference_id: Option<i64>,
    pub amount: Option<i64>,
}
