//! Feats and their structured benefits and prerequisites.

use serde::{Deserialize, Serialize};

use crate::ids::FeatId;

/// A feat.
///
/// The free-text fields (`benefit`, `prerequisites`, ...) hold the rules text
/// as printed. `benefits` and `prereqs` are the machine-readable versions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feat {
    pub id: FeatId,
    pub name: String,
    pub type_id: Option<i64>,
    pub description: Option<String>,
    pub benefit: Option<String>,
    pub normal_effect: Option<String>,
    pub special_effect: Option<String>,
    pub prerequisites: Option<String>,
    pub repeatable: bool,
    pub fighter_bonus: bool,
    #[serde(default)]
    pub benefits: Vec<FeatEffect>,
    #[serde(default)]
    pub prereqs: Vec<FeatEffect>,
}

/// One structured benefit or prerequisite row.
///
/// `type_id` says what `reference_id` points at (a skill, an ability, another
/// feat...), and `amount` carries the bonus or minimum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatEffect {
    pub index: i64,
    pub type_id: i64,
    pub reference_id: Option<i64>,
    pub amount: Option<i64>,
}
