//! Response envelopes.

use std::collections::BTreeMap;

use grimoire_domain::{LookupEntry, LookupKind, NamedRef, ReferenceTableData};
use serde::{Deserialize, Serialize};

// =============================================================================
// Accounts
// =============================================================================

/// Public view of a user.
///
/// The snake_case duplicates are kept for older clients that read the
/// token-era field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    #[serde(rename = "preferredEditionId")]
    pub preferred_edition_id: Option<i64>,
    #[serde(rename = "is_admin")]
    pub is_admin_alias: bool,
    #[serde(rename = "preferred_edition_id")]
    pub preferred_edition_id_alias: Option<i64>,
}

impl UserView {
    pub fn new(
        id: i64,
        username: impl Into<String>,
        is_admin: bool,
        preferred_edition_id: Option<i64>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            is_admin,
            preferred_edition_id,
            is_admin_alias: is_admin,
            preferred_edition_id_alias: preferred_edition_id,
        }
    }
}

/// Profile view: the user view plus the email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    #[serde(flatten)]
    pub user: UserView,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeResponse {
    pub user: UserView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdateResponse {
    pub message: String,
    pub user: ProfileView,
    pub token: String,
}

// =============================================================================
// Generic
// =============================================================================

/// Returned by create operations. `id` is numeric or a slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedResponse<T> {
    pub id: T,
    pub message: String,
}

impl<T> CreatedResponse<T> {
    pub fn new(id: T, message: impl Into<String>) -> Self {
        Self {
            id,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// =============================================================================
// Lookups and markdown
// =============================================================================

/// Every lookup list plus live name lists for select boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupsResponse {
    #[serde(flatten)]
    pub lists: BTreeMap<LookupKind, Vec<LookupEntry>>,
    pub classes: Vec<NamedRef>,
    pub races: Vec<NamedRef>,
    pub spells: Vec<NamedRef>,
}

/// A resolved reference: a catalog row, a race trait, or a whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResolvedEntity {
    Link { id: i64, name: String },
    Trait { slug: String, name: String },
    Table(Box<ReferenceTableData>),
}

/// `{ "<type>": { "<lower-cased name>": resolved or null } }`
pub type ResolveResponse = BTreeMap<String, BTreeMap<String, Option<ResolvedEntity>>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderMarkdownResponse {
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_view_carries_both_spellings() {
        let json = serde_json::to_value(UserView::new(1, "elminster", true, Some(5)))
            .expect("serialize");
        assert_eq!(json["isAdmin"], true);
        assert_eq!(json["is_admin"], true);
        assert_eq!(json["preferredEditionId"], 5);
        assert_eq!(json["preferred_edition_id"], 5);
    }

    #[test]
    fn resolved_traits_carry_their_slug() {
        let mut spells = BTreeMap::new();
        spells.insert(
            "fireball".to_string(),
            Some(ResolvedEntity::Link {
                id: 12,
                name: "Fireball".into(),
            }),
        );
        spells.insert("wish".to_string(), None);
        let mut traits = BTreeMap::new();
        traits.insert(
            "darkvision".to_string(),
            Some(ResolvedEntity::Trait {
                slug: "darkvision".into(),
                name: "Darkvision".into(),
            }),
        );
        let mut response = ResolveResponse::new();
        response.insert("spell".into(), spells);
        response.insert("trait".into(), traits);

        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["spell"]["fireball"]["id"], 12);
        assert!(json["spell"]["wish"].is_null());
        assert_eq!(json["trait"]["darkvision"]["slug"], "darkvision");
    }

    #[test]
    fn lookups_flatten_lists_by_kind() {
        let mut lists = BTreeMap::new();
        lists.insert(
            LookupKind::FeatTypes,
            vec![LookupEntry {
                id: 1,
                name: "General".into(),
                abbreviation: None,
            }],
        );
        let json = serde_json::to_value(LookupsResponse {
            lists,
            classes: vec![],
            races: vec![],
            spells: vec![],
        })
        .expect("serialize");
        assert_eq!(json["featTypes"][0]["name"], "General");
        assert!(json["classes"].as_array().is_some());
    }
}
