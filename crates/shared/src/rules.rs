//! Custom field rules used by `#[validate(custom(...))]` attributes.

use std::borrow::Cow;

use validator::ValidationError;

fn failure(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Usernames are ASCII letters, digits and underscores.
pub fn username_charset(value: &str) -> Result<(), ValidationError> {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(failure(
            "username_charset",
            "Username can only contain letters, numbers, and underscores",
        ))
    }
}

/// Passwords need at least one lowercase letter, one uppercase letter and one digit.
pub fn password_strength(value: &str) -> Result<(), ValidationError> {
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if has_lower && has_upper && has_digit {
        Ok(())
    } else {
        Err(failure(
            "password_strength",
            "Password must contain at least one uppercase letter, one lowercase letter, and one number",
        ))
    }
}

pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(failure("not_blank", "Value cannot be blank"))
    } else {
        Ok(())
    }
}

/// Racial ability adjustments stay within -10..=10.
pub fn ability_adjustment(value: i64) -> Result<(), ValidationError> {
    if (-10..=10).contains(&value) {
        Ok(())
    } else {
        Err(failure(
            "ability_adjustment",
            "Adjustment must be between -10 and 10",
        ))
    }
}
