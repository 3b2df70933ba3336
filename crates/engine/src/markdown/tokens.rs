//! Reference token scanner.
//!
//! Tokens are `{Type: value}` or `[Type: value]`. The type decides what the
//! token becomes; an unknown type leaves the token as literal text.

use std::sync::LazyLock;

use grimoire_domain::EntityKind;
use regex_lite::Regex;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z]+):\s*([^}]+)\}|\[([A-Za-z]+):\s*([^\]]+)\]").expect("valid regex")
});

/// A recognized token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Link to a catalog entity. `text` is the value as written.
    Entity {
        kind: EntityKind,
        key: String,
        text: &'a str,
    },
    /// Embedded reference table.
    Table { key: String, raw: &'a str },
    /// Caller-supplied variable. `name` is lower-cased.
    Variable { name: String, raw: &'a str },
}

/// A piece of scanned text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Token(Token<'a>),
}

fn classify<'a>(type_name: &str, value: &'a str, raw: &'a str) -> Option<Token<'a>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if type_name.eq_ignore_ascii_case("var") {
        return Some(Token::Variable {
            name: value.to_lowercase(),
            raw,
        });
    }
    let kind = type_name.parse::<EntityKind>().ok()?;
    let key = value.to_lowercase();
    Some(match kind {
        EntityKind::ReferenceTable => Token::Table { key, raw },
        kind => Token::Entity {
            kind,
            key,
            text: value,
        },
    })
}

/// Split `text` into literal runs and tokens, in source order.
///
/// Adjacent literal runs are not merged.
pub fn scan(text: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in TOKEN_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let (type_name, value) = match (caps.get(1), caps.get(2), caps.get(3), caps.get(4)) {
            (Some(t), Some(v), _, _) | (_, _, Some(t), Some(v)) => (t.as_str(), v.as_str()),
            _ => continue,
        };
        let Some(token) = classify(type_name, value, whole.as_str()) else {
            continue;
        };

        if whole.start() > last {
            segments.push(Segment::Text(&text[last..whole.start()]));
        }
        segments.push(Segment::Token(token));
        last = whole.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(&text[last..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<Token<'_>> {
        scan(text)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Token(token) => Some(token),
                Segment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn recognizes_both_bracket_styles() {
        let found = tokens("Cast {Spell: Fireball} or take [Feat: Power Attack].");
        assert_eq!(
            found,
            vec![
                Token::Entity {
                    kind: EntityKind::Spell,
                    key: "fireball".into(),
                    text: "Fireball",
                },
                Token::Entity {
                    kind: EntityKind::Feat,
                    key: "power attack".into(),
                    text: "Power Attack",
                },
            ]
        );
    }

    #[test]
    fn tables_and_variables_are_their_own_tokens() {
        let found = tokens("{Table: Turn-Undead} at level {var: level}");
        assert_eq!(
            found,
            vec![
                Token::Table {
                    key: "turn-undead".into(),
                    raw: "{Table: Turn-Undead}",
                },
                Token::Variable {
                    name: "level".into(),
                    raw: "{var: level}",
                },
            ]
        );
    }

    #[test]
    fn unknown_types_stay_literal() {
        let segments = scan("a {Monster: Owlbear} b");
        assert!(segments.iter().all(|s| matches!(s, Segment::Text(_))));
        let joined: String = segments
            .iter()
            .map(|s| match s {
                Segment::Text(t) => *t,
                Segment::Token(_) => "",
            })
            .collect();
        assert_eq!(joined, "a {Monster: Owlbear} b");
    }

    #[test]
    fn keeps_surrounding_text_in_order() {
        let segments = scan("see {Trait: darkvision}!");
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::Text("see "));
        assert_eq!(segments[2], Segment::Text("!"));
    }

    #[test]
    fn variable_names_are_lower_cased() {
        assert_eq!(
            tokens("[VAR: Caster Level]"),
            vec![Token::Variable {
                name: "caster level".into(),
                raw: "[VAR: Caster Level]",
            }]
        );
    }

    #[test]
    fn blank_values_are_not_tokens() {
        assert!(tokens("{Spell:   }").is_empty());
    }
}
