//! Domain entities.

mod character;
mod class;
mod entity_ref;
mod feat;
mod lookup;
mod race;
mod reference_table;
mod skill;
mod spell;
mod user;

pub use character::Character;
pub use class::{Class, ClassFeature, ClassFeatureGrant};
pub use entity_ref::{EntityKind, EntityLink, LinkTarget};
pub use feat::{Feat, FeatEffect};
pub use lookup::{LookupEntry, LookupKind, NamedRef};
pub use race::{Race, RaceAbilityAdjustment, RaceLanguage, RaceTrait, RaceTraitGrant};
pub use reference_table::{
    ColumnAlignment, ReferenceTable, ReferenceTableCell, ReferenceTableColumn, ReferenceTableData,
    ReferenceTableRow, ReferenceTableSummary, StoredRow,
};
pub use skill::Skill;
pub use spell::{Spell, SpellClassLevel};
pub use user::{NewUser, User};
