//! Request bodies.
//!
//! Every body derives [`validator::Validate`]; the engine validates it before
//! calling into a use case, so use cases can rely on documented bounds.

mod auth;
mod character;
mod class;
mod feat;
mod markdown;
mod race;
mod reference_table;
mod skill;
mod spell;

pub use auth::{LoginRequest, RegisterRequest, UpdateProfileRequest};
pub use character::CharacterRequest;
pub use class::{ClassFeatureGrantRequest, ClassFeatureRequest, ClassRequest};
pub use feat::{FeatEffectRequest, FeatRequest};
pub use markdown::{RenderMarkdownRequest, ResolveQuery, ResolveRequest};
pub use race::{
    RaceAdjustmentRequest, RaceLanguageRequest, RaceRequest, RaceTraitGrantRequest,
    RaceTraitRequest,
};
pub use reference_table::{
    ReferenceTableCellRequest, ReferenceTableColumnRequest, ReferenceTableRequest,
    ReferenceTableRowRequest,
};
pub use skill::SkillRequest;
pub use spell::{SpellLevelRequest, SpellRequest};
