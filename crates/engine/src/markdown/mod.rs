//! Markdown rendering with embedded entity references.
//!
//! Rules text mentions other entities inline (`{Spell: Fireball}`,
//! `[Feat: Power Attack]`), embeds reference tables (`{Table: turn-undead}`)
//! and substitutes caller-supplied variables (`{var: level}`).
//!
//! Rendering is split so that no syntax tree lives across an `.await`:
//!
//! 1. [`collect_references`] parses the source and gathers every reference
//!    key into a [`ReferenceSet`].
//! 2. The caller resolves the whole set in one batch, producing
//!    [`Resolutions`].
//! 3. [`render_html`] parses again and splices the resolutions into the tree
//!    before serializing.

mod render;
mod table;
mod tokens;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use grimoire_domain::{EntityKind, EntityLink, ReferenceTableData};

pub use render::{collect_references, collect_table_references, render_html, RenderOptions};
pub use table::{plain_text_len, render_table, MAX_COLUMN_WIDTH};
pub use tokens::{scan, Segment, Token};

/// What a reference resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Link(EntityLink),
    Table(Arc<ReferenceTableData>),
}

/// Reference keys grouped by kind. Keys are lower-cased.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceSet {
    keys: BTreeMap<EntityKind, BTreeSet<String>>,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, key: impl Into<String>) {
        self.keys.entry(kind).or_default().insert(key.into());
    }

    pub fn contains(&self, kind: EntityKind, key: &str) -> bool {
        self.keys.get(&kind).is_some_and(|keys| keys.contains(key))
    }

    pub fn is_empty(&self) -> bool {
        self.keys.values().all(BTreeSet::is_empty)
    }

    /// Total number of keys across kinds.
    pub fn len(&self) -> usize {
        self.keys.values().map(BTreeSet::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityKind, &BTreeSet<String>)> {
        self.keys
            .iter()
            .filter(|(_, keys)| !keys.is_empty())
            .map(|(kind, keys)| (*kind, keys))
    }

    /// Keys in `self` that `other` does not have.
    pub fn difference(&self, other: &ReferenceSet) -> ReferenceSet {
        let mut out = ReferenceSet::new();
        for (kind, keys) in self.iter() {
            for key in keys {
                if !other.contains(kind, key) {
                    out.insert(kind, key.clone());
                }
            }
        }
        out
    }

    pub fn extend(&mut self, other: ReferenceSet) {
        for (kind, keys) in other.keys {
            self.keys.entry(kind).or_default().extend(keys);
        }
    }
}

/// Resolved references keyed by kind and lower-cased key. Misses are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolutions {
    entries: HashMap<(EntityKind, String), Resolution>,
}

impl Resolutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: EntityKind, key: impl Into<String>, resolution: Resolution) {
        self.entries.insert((kind, key.into()), resolution);
    }

    pub fn get(&self, kind: EntityKind, key: &str) -> Option<&Resolution> {
        self.entries.get(&(kind, key.to_string()))
    }

    /// The link for an entity reference, if it resolved to one.
    pub fn link(&self, kind: EntityKind, key: &str) -> Option<&EntityLink> {
        match self.get(kind, key) {
            Some(Resolution::Link(link)) => Some(link),
            _ => None,
        }
    }

    /// The table for a table reference, if it resolved.
    pub fn table(&self, key: &str) -> Option<&ReferenceTableData> {
        match self.get(EntityKind::ReferenceTable, key) {
            Some(Resolution::Table(table)) => Some(table.as_ref()),
            _ => None,
        }
    }

    pub fn tables(&self) -> impl Iterator<Item = &ReferenceTableData> {
        self.entries.values().filter_map(|resolution| match resolution {
            Resolution::Table(table) => Some(table.as_ref()),
            Resolution::Link(_) => None,
        })
    }

    pub fn extend(&mut self, other: Resolutions) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> impl Iterator<Item = ((EntityKind, String), Resolution)> {
        self.entries.into_iter()
    }
}
