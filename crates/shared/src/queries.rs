//! List query strings.
//!
//! Every list endpoint accepts `page`, `limit`, `sort` and `order` plus its
//! own filters. Unknown sort columns fall back to `name`; multi-valued
//! filters are comma separated (`?classId=3,7`).

use grimoire_domain::{DomainError, PageRequest, SortOrder, DEFAULT_PAGE_LIMIT};
use serde::{Deserialize, Serialize};

/// Default page size for user-facing lists (characters, reference tables).
pub const USER_LIST_PAGE_LIMIT: u32 = 25;

macro_rules! paged_query {
    ($name:ident, $default_limit:expr) => {
        impl $name {
            pub fn page_request(&self) -> PageRequest {
                PageRequest::new(self.page, self.limit, $default_limit)
            }

            pub fn sort_order(&self) -> SortOrder {
                self.order.unwrap_or_default()
            }
        }
    };
}

/// Parse a comma-separated id list. `None` and empty input give an empty list.
pub fn parse_id_list(raw: Option<&str>) -> Result<Vec<i64>, DomainError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| DomainError::parse(format!("Invalid id in list: {}", s)))
        })
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub edition_id: Option<i64>,
    pub is_prestige: Option<bool>,
    pub is_visible: Option<bool>,
    pub can_cast_spells: Option<bool>,
    pub hit_die: Option<i64>,
}
paged_query!(ClassListQuery, DEFAULT_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassFeatureListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub slug: Option<String>,
    pub name: Option<String>,
}
paged_query!(ClassFeatureListQuery, DEFAULT_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub edition_id: Option<i64>,
    pub is_visible: Option<bool>,
    pub size_id: Option<i64>,
    pub speed: Option<i64>,
    pub favored_class_id: Option<i64>,
}
paged_query!(RaceListQuery, DEFAULT_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceTraitListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub slug: Option<String>,
    pub name: Option<String>,
    pub has_value: Option<bool>,
}
paged_query!(RaceTraitListQuery, DEFAULT_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub ability_id: Option<i64>,
    pub trained_only: Option<bool>,
    pub affected_by_armor: Option<bool>,
}
paged_query!(SkillListQuery, DEFAULT_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub type_id: Option<i64>,
    pub description: Option<String>,
    pub benefit: Option<String>,
    pub normal_effect: Option<String>,
    pub special_effect: Option<String>,
    pub prerequisites: Option<String>,
    pub repeatable: Option<bool>,
}
paged_query!(FeatListQuery, DEFAULT_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub edition_id: Option<i64>,
    pub base_level: Option<i64>,
    /// Comma-separated class ids
    pub class_id: Option<String>,
    /// Comma-separated class levels
    pub spell_level: Option<String>,
    /// Comma-separated school ids
    pub schools: Option<String>,
    /// Comma-separated descriptor ids
    pub descriptors: Option<String>,
    /// Comma-separated component ids
    pub components: Option<String>,
}
paged_query!(SpellListQuery, DEFAULT_PAGE_LIMIT);

/// Parsed multi-valued spell filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpellListFilters {
    pub class_ids: Vec<i64>,
    pub spell_levels: Vec<i64>,
    pub school_ids: Vec<i64>,
    pub descriptor_ids: Vec<i64>,
    pub component_ids: Vec<i64>,
}

impl SpellListQuery {
    pub fn filters(&self) -> Result<SpellListFilters, DomainError> {
        Ok(SpellListFilters {
            class_ids: parse_id_list(self.class_id.as_deref())?,
            spell_levels: parse_id_list(self.spell_level.as_deref())?,
            school_ids: parse_id_list(self.schools.as_deref())?,
            descriptor_ids: parse_id_list(self.descriptors.as_deref())?,
            component_ids: parse_id_list(self.components.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub user_id: Option<i64>,
}
paged_query!(CharacterListQuery, USER_LIST_PAGE_LIMIT);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
    pub name: Option<String>,
    pub slug: Option<String>,
}
paged_query!(ReferenceTableListQuery, USER_LIST_PAGE_LIMIT);
