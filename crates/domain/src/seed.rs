//! Built-in reference data.
//!
//! These lists are part of the rules, not user content. They are written to
//! the lookup store at startup with insert-or-ignore semantics, so local
//! edits to names survive restarts.

use crate::entities::{LookupEntry, LookupKind};

type SeedRow = (i64, &'static str, Option<&'static str>);

const EDITIONS: &[SeedRow] = &[
    (1, "Original Dungeons & Dragons", Some("OD&D")),
    (2, "Advanced Dungeons & Dragons", Some("AD&D")),
    (3, "Advanced Dungeons & Dragons 2nd Edition", Some("AD&D 2E")),
    (4, "Dungeons & Dragons 3rd Edition", Some("D&D 3E")),
    (5, "Dungeons & Dragons 3.5 Edition", Some("D&D 3.5E")),
    (6, "Dungeons & Dragons 4th Edition", Some("D&D 4E")),
    (7, "Dungeons & Dragons 5th Edition", Some("D&D 5E")),
];

const ABILITIES: &[SeedRow] = &[
    (1, "Strength", Some("STR")),
    (2, "Dexterity", Some("DEX")),
    (3, "Constitution", Some("CON")),
    (4, "Intelligence", Some("INT")),
    (5, "Wisdom", Some("WIS")),
    (6, "Charisma", Some("CHA")),
];

const ALIGNMENTS: &[SeedRow] = &[
    (0, "Lawful Good", Some("LG")),
    (1, "Neutral Good", Some("NG")),
    (2, "Chaotic Good", Some("CG")),
    (3, "Lawful Neutral", Some("LN")),
    (4, "True Neutral", Some("N")),
    (5, "Chaotic Neutral", Some("CN")),
    (6, "Lawful Evil", Some("LE")),
    (7, "Neutral Evil", Some("NE")),
    (8, "Chaotic Evil", Some("CE")),
];

const SIZES: &[SeedRow] = &[
    (1, "Fine", Some("F")),
    (2, "Diminutive", Some("D")),
    (3, "Tiny", Some("T")),
    (4, "Small", Some("S")),
    (5, "Medium", Some("M")),
    (6, "Large", Some("L")),
    (7, "Huge", Some("H")),
    (8, "Gargantuan", Some("G")),
    (9, "Colossal", Some("C")),
];

const LANGUAGES: &[SeedRow] = &[
    (1, "Abyssal", None),
    (2, "Aquan", None),
    (3, "Auran", None),
    (4, "Celestial", None),
    (5, "Common", None),
    (6, "Draconic", None),
    (7, "Druidic", None),
    (8, "Dwarven", None),
    (9, "Elven", None),
    (10, "Giant", None),
    (11, "Gnome", None),
    (12, "Goblin", None),
    (13, "Gnoll", None),
    (14, "Halfling", None),
    (15, "Ignan", None),
    (16, "Infernal", None),
    (17, "Orc", None),
    (18, "Sylvan", None),
    (19, "Terran", None),
    (20, "Undercommon", None),
];

const SCHOOLS: &[SeedRow] = &[
    (1, "Abjuration", Some("abj")),
    (2, "Conjuration", Some("conj")),
    (3, "Divination", Some("div")),
    (4, "Enchantment", Some("ench")),
    (5, "Evocation", Some("evoc")),
    (6, "Illusion", Some("illu")),
    (7, "Necromancy", Some("nec")),
    (8, "Transmutation", Some("tran")),
    (9, "Universal", Some("univ")),
    (10, "Invocation", Some("inv")),
];

const SUBSCHOOLS: &[SeedRow] = &[
    (1, "Calling", None),
    (2, "Creation", None),
    (3, "Healing", None),
    (4, "Summoning", None),
    (5, "Teleportation", None),
    (6, "Scrying", None),
    (7, "Charm", None),
    (8, "Compulsion", None),
    (9, "Figment", None),
    (10, "Glamer", None),
    (11, "Pattern", None),
    (12, "Phantasm", None),
    (13, "Shadow", None),
    (14, "Least", None),
    (15, "Lesser", None),
    (16, "Greater", None),
    (17, "Dark", None),
];

const DESCRIPTORS: &[SeedRow] = &[
    (1, "Acid", None),
    (2, "Air", None),
    (3, "Chaotic", None),
    (4, "Cold", None),
    (5, "Darkness", None),
    (6, "Death", None),
    (7, "Earth", None),
    (8, "Electricity", None),
    (9, "Evil", None),
    (10, "Fear", None),
    (11, "Fire", None),
    (12, "Force", None),
    (13, "Good", None),
    (14, "Language-dependent", None),
    (15, "Lawful", None),
    (16, "Light", None),
    (17, "Mind-affecting", None),
    (18, "Sonic", None),
    (19, "Water", None),
    (20, "See text", None),
    (21, "Eldritch essence", None),
    (22, "Blast shape", None),
];

const COMPONENTS: &[SeedRow] = &[
    (0, "Verbal", Some("V")),
    (1, "Somatic", Some("S")),
    (2, "Material", Some("M")),
    (3, "Focus", Some("F")),
    (4, "Divine Focus", Some("DF")),
    (5, "XP", Some("X")),
];

const RANGES: &[SeedRow] = &[
    (1, "Touch", Some("tch")),
    (2, "Personal", Some("per")),
    (3, "Close", Some("cls")),
    (4, "Medium", Some("med")),
    (5, "Long", Some("lng")),
    (6, "Unlimited", Some("unl")),
    (7, "Foot", Some("ft.")),
    (8, "Mile", Some("mi.")),
    (9, "Special", Some("spc")),
];

const FEAT_TYPES: &[SeedRow] = &[
    (1, "General", None),
    (2, "Item Creation", None),
    (3, "Metamagic", None),
];

const FEAT_BENEFIT_TYPES: &[SeedRow] = &[
    (1, "Skill", None),
    (2, "Save", None),
    (3, "Proficiency", None),
];

const FEAT_PREREQUISITE_TYPES: &[SeedRow] = &[
    (1, "Ability", None),
    (2, "Skill", None),
    (3, "Feat", None),
    (4, "Base Attack Bonus", None),
    (5, "Caster Level", None),
    (6, "Special", None),
];

fn rows_for(kind: LookupKind) -> &'static [SeedRow] {
    match kind {
        LookupKind::Editions => EDITIONS,
        LookupKind::Abilities => ABILITIES,
        LookupKind::Alignments => ALIGNMENTS,
        LookupKind::Sizes => SIZES,
        LookupKind::Languages => LANGUAGES,
        LookupKind::Schools => SCHOOLS,
        LookupKind::Subschools => SUBSCHOOLS,
        LookupKind::Descriptors => DESCRIPTORS,
        LookupKind::Components => COMPONENTS,
        LookupKind::Ranges => RANGES,
        LookupKind::FeatTypes => FEAT_TYPES,
        LookupKind::FeatBenefitTypes => FEAT_BENEFIT_TYPES,
        LookupKind::FeatPrerequisiteTypes => FEAT_PREREQUISITE_TYPES,
    }
}

/// Every built-in lookup entry, tagged with its list.
pub fn seed_entries() -> Vec<(LookupKind, LookupEntry)> {
    LookupKind::ALL
        .into_iter()
        .flat_map(|kind| {
            rows_for(kind).iter().map(move |(id, name, abbreviation)| {
                (
                    kind,
                    LookupEntry {
                        id: *id,
                        name: (*name).to_string(),
                        abbreviation: abbreviation.map(str::to_string),
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_kind_has_entries() {
        let entries = seed_entries();
        for kind in LookupKind::ALL {
            assert!(entries.iter().any(|(k, _)| *k == kind), "{kind} is empty");
        }
    }

    #[test]
    fn ids_are_unique_per_kind() {
        let entries = seed_entries();
        let unique: HashSet<(LookupKind, i64)> =
            entries.iter().map(|(kind, entry)| (*kind, entry.id)).collect();
        assert_eq!(unique.len(), entries.len());
    }

    #[test]
    fn medium_is_size_five() {
        let medium = seed_entries()
            .into_iter()
            .find(|(kind, entry)| *kind == LookupKind::Sizes && entry.id == 5)
            .map(|(_, entry)| entry.name);
        assert_eq!(medium.as_deref(), Some("Medium"));
    }
}
