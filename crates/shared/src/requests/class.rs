use grimoire_domain::Slug;
use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_true() -> bool {
    true
}

/// Body of `POST /api/classes` and `PUT /api/classes/{id}`.
///
/// `features`, when present, replaces the class's feature grants.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,
    #[validate(length(
        min = 1,
        max = 10,
        message = "Abbreviation must be between 1 and 10 characters"
    ))]
    pub abbreviation: String,
    pub edition_id: Option<i64>,
    #[serde(default)]
    pub is_prestige: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub can_cast_spells: bool,
    #[validate(range(min = 1, max = 20, message = "Hit die must be between 1 and 20"))]
    pub hit_die: i64,
    #[validate(range(min = 0, max = 100, message = "Skill points must be between 0 and 100"))]
    pub skill_points: i64,
    pub casting_ability_id: Option<i64>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(nested)]
    pub features: Option<Vec<ClassFeatureGrantRequest>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeatureGrantRequest {
    pub feature_slug: Slug,
    #[validate(range(min = 1, max = 40, message = "Level must be between 1 and 40"))]
    pub level: i64,
}

/// Body of `POST /api/classes/features` and `PUT /api/classes/features/{slug}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeatureRequest {
    pub slug: Slug,
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visibility_defaults_to_true() {
        let req: ClassRequest = serde_json::from_value(serde_json::json!({
            "name": "Wizard",
            "abbreviation": "Wiz",
            "hitDie": 4,
            "skillPoints": 2
        }))
        .expect("deserialize");
        assert!(req.is_visible);
        assert!(!req.is_prestige);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_hit_die() {
        let req: ClassRequest = serde_json::from_value(serde_json::json!({
            "name": "Wizard",
            "abbreviation": "Wiz",
            "hitDie": 0,
            "skillPoints": 2
        }))
        .expect("deserialize");
        let errors = req.validate().expect_err("hit die");
        assert!(errors.field_errors().contains_key("hit_die"));
    }
}
