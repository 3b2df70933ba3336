//! Edition filtering rules.

/// Edition id of D&D 3rd Edition.
pub const EDITION_3E: i64 = 4;

/// Edition id of D&D 3.5 Edition.
pub const EDITION_3_5E: i64 = 5;

/// Expand an edition filter into the set of edition ids it matches.
///
/// 3.5E is a revision of 3E, so asking for 3E material also returns 3.5E
/// material. Every other edition matches exactly.
pub fn editions_matching(edition_id: i64) -> Vec<i64> {
    if edition_id == EDITION_3E {
        vec![EDITION_3E, EDITION_3_5E]
    } else {
        vec![edition_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn third_edition_includes_revision() {
        assert_eq!(editions_matching(4), vec![4, 5]);
        assert_eq!(editions_matching(5), vec![5]);
        assert_eq!(editions_matching(7), vec![7]);
    }
}
