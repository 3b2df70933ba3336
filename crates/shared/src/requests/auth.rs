use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        length(min = 3, max = 50, message = "Username must be between 3 and 50 characters"),
        custom(function = "crate::rules::username_charset")
    )]
    pub username: String,
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,
    #[validate(
        length(min = 8, max = 100, message = "Password must be between 8 and 100 characters"),
        custom(function = "crate::rules::password_strength")
    )]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(range(min = 1, message = "Invalid edition"))]
    pub preferred_edition_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn accepts_well_formed_registration() {
        assert!(register("mordenkainen_1", "m@greyhawk.test", "Secret123")
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_bad_usernames() {
        assert!(register("ab", "m@greyhawk.test", "Secret123").validate().is_err());
        assert!(register("bad name!", "m@greyhawk.test", "Secret123")
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_weak_passwords() {
        let errors = register("tenser", "t@greyhawk.test", "alllowercase1")
            .validate()
            .expect_err("missing uppercase");
        assert!(errors.field_errors().contains_key("password"));
        assert!(register("tenser", "t@greyhawk.test", "Short1").validate().is_err());
    }

    #[test]
    fn rejects_invalid_email() {
        let errors = register("tenser", "not-an-email", "Secret123")
            .validate()
            .expect_err("bad email");
        assert!(errors.field_errors().contains_key("email"));
    }
}
