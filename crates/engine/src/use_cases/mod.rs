//! Use cases - User story orchestration.
//!
//! Each module covers one area of the API. Use cases depend on port traits
//! only, so they are tested against mocks.

pub mod auth;
pub mod lookups;
pub mod management;
pub mod markdown;
pub mod profile;
pub mod resolve;

// Re-export main types
pub use auth::{AuthError, AuthUseCases};
pub use lookups::LookupUseCases;
pub use management::{Actor, ManagementError, ManagementUseCases};
pub use markdown::RenderMarkdown;
pub use profile::ProfileUseCases;
pub use resolve::{ResolutionCache, ResolveEntities, ResolveError};
