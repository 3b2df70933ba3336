//! API layer - HTTP entry points.

mod auth_routes;
mod character_routes;
mod class_routes;
pub mod error;
pub mod extractors;
mod feat_routes;
pub mod http;
mod lookup_routes;
mod markdown_routes;
pub mod middleware;
mod profile_routes;
mod race_routes;
mod reference_table_routes;
mod skill_routes;
mod spell_routes;

pub use error::ApiError;
