use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/characters` and `PUT /api/characters/{id}`.
///
/// `userId` is only honoured for admins; everyone else creates characters
/// for themselves.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRequest {
    pub user_id: Option<i64>,
    #[validate(
        length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"),
        custom(function = "crate::rules::not_blank")
    )]
    pub name: String,
    #[validate(range(min = 1, message = "Race is required"))]
    pub race_id: i64,
    #[validate(range(min = 0, max = 8, message = "Invalid alignment"))]
    pub alignment_id: i64,
    #[validate(range(min = 0, max = 1000, message = "Age must be between 0 and 1000"))]
    pub age: Option<i64>,
    #[validate(range(min = 1, max = 1000, message = "Height must be between 1 and 1000"))]
    pub height: Option<i64>,
    #[validate(range(min = 1, max = 10000, message = "Weight must be between 1 and 10000"))]
    pub weight: Option<i64>,
    #[validate(length(max = 50))]
    pub eyes: Option<String>,
    #[validate(length(max = 50))]
    pub hair: Option<String>,
    #[validate(length(max = 20))]
    pub gender: Option<String>,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, age: Option<i64>) -> CharacterRequest {
        CharacterRequest {
            user_id: None,
            name: name.into(),
            race_id: 1,
            alignment_id: 4,
            age,
            height: None,
            weight: None,
            eyes: None,
            hair: None,
            gender: None,
            notes: None,
        }
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(request("   ", None).validate().is_err());
        assert!(request("Regdar", Some(27)).validate().is_ok());
    }

    #[test]
    fn age_is_bounded() {
        assert!(request("Lidda", Some(1001)).validate().is_err());
    }
}
