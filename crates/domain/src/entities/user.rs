//! User accounts.

use chrono::{DateTime, Utc};

use crate::ids::UserId;

/// A registered user.
///
/// Not serializable on purpose: the password hash must never leave the
/// engine. HTTP responses use dedicated view types instead.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    /// Edition the user's lists default to
    pub preferred_edition_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a user. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
}
