//! Value objects: validated primitives with no identity of their own.

pub mod edition;
pub mod pagination;
pub mod slug;

pub use edition::{editions_matching, EDITION_3E, EDITION_3_5E};
pub use pagination::{Page, PageRequest, SortOrder, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
pub use slug::{Slug, MAX_SLUG_LENGTH};
