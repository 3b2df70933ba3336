use grimoire_domain::Slug;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Body of `POST /api/races` and `PUT /api/races/{id}`.
///
/// Each nested list, when present, replaces the stored list wholesale.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaceRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: Option<String>,
    pub size_id: Option<i64>,
    #[validate(range(min = 0, max = 1000, message = "Speed must be between 0 and 1000"))]
    pub speed: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "Favored class must be 0 (any) or a class id"))]
    pub favored_class_id: i64,
    pub edition_id: Option<i64>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[validate(nested)]
    pub languages: Option<Vec<RaceLanguageRequest>>,
    #[validate(nested)]
    pub adjustments: Option<Vec<RaceAdjustmentRequest>>,
    #[validate(nested)]
    pub traits: Option<Vec<RaceTraitGrantRequest>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaceLanguageRequest {
    #[validate(range(min = 1, message = "Invalid language"))]
    pub language_id: i64,
    #[serde(default)]
    pub is_automatic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaceAdjustmentRequest {
    #[validate(range(min = 1, max = 6, message = "Invalid ability"))]
    pub ability_id: i64,
    #[validate(custom(function = "crate::rules::ability_adjustment"))]
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaceTraitGrantRequest {
    pub trait_slug: Slug,
    #[validate(length(max = 200, message = "Trait value must be at most 200 characters"))]
    pub value: Option<String>,
}

/// Body of `POST /api/races/traits` and `PUT /api/races/traits/{slug}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RaceTraitRequest {
    pub slug: Slug,
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
    #[serde(default)]
    pub has_value: bool,
}
