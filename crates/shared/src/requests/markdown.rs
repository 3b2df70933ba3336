use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body of `POST /api/entities/resolve`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    #[validate(length(max = 500, message = "At most 500 queries per request"), nested)]
    pub queries: Vec<ResolveQuery>,
}

/// One `{type, name}` reference to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQuery {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50))]
    pub kind: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
}

/// Body of `POST /api/markdown/render`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RenderMarkdownRequest {
    #[validate(length(max = 100000, message = "Markdown must be at most 100000 characters"))]
    pub markdown: String,
    /// Values substituted for `{var: name}` tokens
    #[serde(default)]
    pub variables: HashMap<String, String>,
    /// Pass raw HTML in the source through instead of escaping it
    #[serde(default)]
    pub allow_raw_html: bool,
}
