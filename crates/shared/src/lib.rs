//! Grimoire Shared - wire types for the HTTP API
//!
//! - Request bodies, validated with `validator` before they reach a use case
//! - List query strings (pagination, sorting, filters)
//! - Response envelopes
//!
//! Read models are the domain entities themselves; they already serialize
//! in camelCase.

pub mod queries;
pub mod requests;
pub mod responses;
pub mod rules;

pub use queries::{
    CharacterListQuery, ClassFeatureListQuery, ClassListQuery, FeatListQuery, RaceListQuery,
    RaceTraitListQuery, ReferenceTableListQuery, SkillListQuery, SpellListFilters, SpellListQuery,
};
pub use requests::{
    CharacterRequest, ClassFeatureGrantRequest, ClassFeatureRequest, ClassRequest,
    FeatEffectRequest, FeatRequest, LoginRequest, RaceAdjustmentRequest, RaceLanguageRequest,
    RaceRequest, RaceTraitGrantRequest, RaceTraitRequest, ReferenceTableCellRequest,
    ReferenceTableColumnRequest, ReferenceTableRequest, ReferenceTableRowRequest, RegisterRequest,
    RenderMarkdownRequest, ResolveQuery, ResolveRequest, SkillRequest, SpellLevelRequest,
    SpellRequest, UpdateProfileRequest,
};
pub use responses::{
    CreatedResponse, LoginResponse, LookupsResponse, MeResponse, MessageResponse,
    ProfileUpdateResponse, ProfileView, RenderMarkdownResponse, ResolveResponse, ResolvedEntity,
    TokenResponse, UserView,
};
