//! Grimoire Engine library.
//!
//! This crate contains all server-side code for the Grimoire rules reference.
//!
//! ## Structure
//!
//! - `use_cases/` - Orchestration of repositories, auth and rendering
//! - `markdown/` - Reference tokens, table rendering and HTML output
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod markdown;
pub mod use_cases;

pub use app::App;
