//! Slugs: human-readable keys for shared rules-text fragments.
//!
//! Race traits, class features and reference tables are keyed by slug rather
//! than by numeric id so markdown can refer to them by a stable name.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length of a slug.
pub const MAX_SLUG_LENGTH: usize = 100;

/// A validated slug: 1-100 characters of `[a-z0-9-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Slug(String);

impl Slug {
    /// Create a new validated slug.
    ///
    /// Surrounding whitespace is trimmed before validation. Uppercase input is
    /// rejected rather than folded so that two spellings never map to one key.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the slug is empty, longer than
    /// 100 characters, or contains anything besides lowercase ASCII letters,
    /// digits and hyphens.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("Slug cannot be empty"));
        }
        if trimmed.len() > MAX_SLUG_LENGTH {
            return Err(DomainError::validation(format!(
                "Slug cannot exceed {} characters",
                MAX_SLUG_LENGTH
            )));
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(DomainError::validation(
                "Slug must contain only lowercase letters, numbers, and hyphens",
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Slug {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slug> for String {
    fn from(slug: Slug) -> Self {
        slug.0
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_digits_and_hyphens() {
        let slug = Slug::new("  low-light-vision-2 ").expect("valid slug");
        assert_eq!(slug.as_str(), "low-light-vision-2");
    }

    #[test]
    fn rejects_invalid_characters() {
        assert!(Slug::new("Darkvision").is_err());
        assert!(Slug::new("dark vision").is_err());
        assert!(Slug::new("dark_vision").is_err());
        assert!(Slug::new("").is_err());
        assert!(Slug::new("a".repeat(101)).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: Result<Slug, _> = serde_json::from_str("\"turn-undead\"");
        assert!(ok.is_ok());
        let bad: Result<Slug, _> = serde_json::from_str("\"Turn Undead\"");
        assert!(bad.is_err());
    }
}
