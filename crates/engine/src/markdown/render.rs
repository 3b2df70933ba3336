//! Parse, scan and splice.

use std::cell::RefCell;
use std::collections::HashMap;

use comrak::arena_tree::Node;
use comrak::nodes::{Ast, AstNode, LineColumn, NodeHtmlBlock, NodeValue};
use comrak::{format_html, parse_document, Arena, Options};
use grimoire_domain::{EntityKind, ReferenceTableData};

use super::table::render_table;
use super::tokens::{scan, Segment, Token};
use super::{ReferenceSet, Resolutions};

/// Per-render settings.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'v> {
    pub variables: &'v HashMap<String, String>,
    /// Pass raw HTML from the source through instead of escaping it.
    pub allow_raw_html: bool,
}

fn configure(options: &mut Options) {
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options.extension.superscript = true;
    // Source HTML is neutralized in the tree instead, so spliced nodes survive.
    options.render.unsafe_ = true;
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = Vec::with_capacity(text.len());
    // Writes into a Vec cannot fail; only ASCII bytes are replaced.
    let _ = comrak::html::escape(&mut out, text.as_bytes());
    String::from_utf8(out).unwrap_or_default()
}

fn new_node<'a>(arena: &'a Arena<AstNode<'a>>, value: NodeValue) -> &'a AstNode<'a> {
    arena.alloc(Node::new(RefCell::new(Ast::new(
        value,
        LineColumn { line: 0, column: 0 },
    ))))
}

fn text_of(node: &AstNode<'_>) -> Option<String> {
    match &node.data.borrow().value {
        NodeValue::Text(text) => Some(text.clone()),
        _ => None,
    }
}

/// Join runs of sibling text nodes, which the parser leaves split around
/// brackets and other punctuation.
fn merge_adjacent_text<'a>(root: &'a AstNode<'a>) {
    let nodes: Vec<_> = root.descendants().collect();
    for node in nodes {
        if node.parent().is_none() || text_of(node).is_none() {
            continue;
        }
        while let Some(next) = node.next_sibling() {
            let Some(more) = text_of(next) else {
                break;
            };
            if let NodeValue::Text(text) = &mut node.data.borrow_mut().value {
                text.push_str(&more);
            }
            next.detach();
        }
    }
}

/// Turn raw HTML from the source into text so it is escaped on output.
fn neutralize_raw_html<'a>(arena: &'a Arena<AstNode<'a>>, root: &'a AstNode<'a>) {
    let nodes: Vec<_> = root.descendants().collect();
    for node in nodes {
        let raw = {
            let ast = node.data.borrow();
            match &ast.value {
                NodeValue::HtmlInline(html) => Some((false, html.clone())),
                NodeValue::HtmlBlock(block) => Some((true, block.literal.clone())),
                _ => None,
            }
        };
        match raw {
            Some((false, html)) => node.data.borrow_mut().value = NodeValue::Text(html),
            Some((true, html)) => {
                node.data.borrow_mut().value = NodeValue::Paragraph;
                node.append(new_node(arena, NodeValue::Text(html.trim_end().to_string())));
            }
            None => {}
        }
    }
}

/// Text nodes outside links and images. Code spans and code blocks carry
/// their content as literals, so they never appear here.
fn scannable_text_nodes<'a>(root: &'a AstNode<'a>) -> Vec<&'a AstNode<'a>> {
    root.descendants()
        .filter(|node| matches!(node.data.borrow().value, NodeValue::Text(_)))
        .filter(|node| {
            !node.ancestors().any(|ancestor| {
                matches!(
                    ancestor.data.borrow().value,
                    NodeValue::Link(_) | NodeValue::Image(_)
                )
            })
        })
        .collect()
}

fn collect_into(source: &str, include_tables: bool, refs: &mut ReferenceSet) {
    let arena = Arena::new();
    let mut options = Options::default();
    configure(&mut options);
    let root = parse_document(&arena, source, &options);
    merge_adjacent_text(root);

    for node in scannable_text_nodes(root) {
        let Some(text) = text_of(node) else {
            continue;
        };
        for segment in scan(&text) {
            match segment {
                Segment::Token(Token::Entity { kind, key, .. }) => refs.insert(kind, key),
                Segment::Token(Token::Table { key, .. }) if include_tables => {
                    refs.insert(EntityKind::ReferenceTable, key)
                }
                _ => {}
            }
        }
    }
}

/// Every entity and table reference in `source`.
pub fn collect_references(source: &str) -> ReferenceSet {
    let mut refs = ReferenceSet::new();
    collect_into(source, true, &mut refs);
    refs
}

/// Entity references in the headers and cells of `tables`. Table tokens in
/// cells are not expanded, so they are not collected.
pub fn collect_table_references<'t>(
    tables: impl IntoIterator<Item = &'t ReferenceTableData>,
) -> ReferenceSet {
    let mut refs = ReferenceSet::new();
    for table in tables {
        for header in &table.headers {
            collect_into(&header.header, false, &mut refs);
        }
        for cell in table.rows.iter().flat_map(|row| row.cells.iter().flatten()) {
            collect_into(&cell.value, false, &mut refs);
        }
    }
    refs
}

struct Splicer<'r> {
    resolutions: &'r Resolutions,
    options: RenderOptions<'r>,
    expand_tables: bool,
}

impl Splicer<'_> {
    fn entity_html(&self, kind: EntityKind, key: &str, text: &str) -> String {
        match self.resolutions.link(kind, key) {
            Some(link) => format!(
                "<a href=\"{}\" class=\"entity-link\">{}</a>",
                escape_html(&link.href(kind)),
                escape_html(text)
            ),
            None => format!(
                "<span class=\"entity-unresolved\">{}</span>",
                escape_html(text)
            ),
        }
    }

    fn table_html(&self, key: &str) -> String {
        match self.resolutions.table(key) {
            Some(table) => {
                let cell_html = |value: &str| self.cell_html(value);
                render_table(table, &cell_html)
            }
            None => format!(
                "<div class=\"reference-table-error\">[Missing table: {}]</div>",
                escape_html(key)
            ),
        }
    }

    /// Cells render inline: entity links resolve, tables stay literal.
    fn cell_html(&self, value: &str) -> String {
        let cell = Splicer {
            resolutions: self.resolutions,
            options: RenderOptions {
                variables: self.options.variables,
                allow_raw_html: true,
            },
            expand_tables: false,
        };
        let html = cell.render(value);
        let trimmed = html.trim();
        match trimmed
            .strip_prefix("<p>")
            .and_then(|inner| inner.strip_suffix("</p>"))
        {
            Some(inner) if !inner.contains("<p>") => inner.to_string(),
            _ => trimmed.to_string(),
        }
    }

    /// `name` is already lower-cased; so are the keys of `variables`.
    fn variable_text(&self, name: &str) -> String {
        match self.options.variables.get(name) {
            Some(value) => value.clone(),
            None => format!("[var: {}]", name),
        }
    }

    /// A paragraph holding nothing but one table token becomes the table.
    fn lone_table_key<'s>(&self, node: &AstNode<'_>, segments: &'s [Segment<'s>]) -> Option<&'s str> {
        if !self.expand_tables {
            return None;
        }
        let parent = node.parent()?;
        if !matches!(parent.data.borrow().value, NodeValue::Paragraph) {
            return None;
        }
        if parent.children().count() != 1 {
            return None;
        }
        let mut tables = segments.iter().filter_map(|segment| match segment {
            Segment::Token(Token::Table { key, .. }) => Some(key.as_str()),
            _ => None,
        });
        let key = tables.next()?;
        let only_whitespace_besides = segments.iter().all(|segment| match segment {
            Segment::Text(text) => text.trim().is_empty(),
            Segment::Token(Token::Table { .. }) => true,
            Segment::Token(_) => false,
        });
        (tables.next().is_none() && only_whitespace_besides).then_some(key)
    }

    fn splice<'a>(&self, arena: &'a Arena<AstNode<'a>>, node: &'a AstNode<'a>) {
        let Some(text) = text_of(node) else {
            return;
        };
        let segments = scan(&text);
        if !segments.iter().any(|s| matches!(s, Segment::Token(_))) {
            return;
        }

        if let Some(key) = self.lone_table_key(node, &segments) {
            if let Some(paragraph) = node.parent() {
                let block = new_node(
                    arena,
                    NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 6,
                        literal: format!("{}\n", self.table_html(key)),
                    }),
                );
                paragraph.insert_before(block);
                paragraph.detach();
            }
            return;
        }

        let mut pending = String::new();
        let flush = |pending: &mut String| {
            if !pending.is_empty() {
                node.insert_before(new_node(arena, NodeValue::Text(std::mem::take(pending))));
            }
        };
        for segment in segments {
            let html = match segment {
                Segment::Text(literal) => {
                    pending.push_str(literal);
                    continue;
                }
                Segment::Token(Token::Variable { name, .. }) => {
                    pending.push_str(&self.variable_text(&name));
                    continue;
                }
                Segment::Token(Token::Table { raw, .. }) if !self.expand_tables => {
                    pending.push_str(raw);
                    continue;
                }
                Segment::Token(Token::Table { key, .. }) => self.table_html(&key),
                Segment::Token(Token::Entity { kind, key, text }) => {
                    self.entity_html(kind, &key, text)
                }
            };
            flush(&mut pending);
            node.insert_before(new_node(arena, NodeValue::HtmlInline(html)));
        }
        flush(&mut pending);
        node.detach();
    }

    fn render(&self, source: &str) -> String {
        let arena = Arena::new();
        let mut options = Options::default();
        configure(&mut options);
        let root = parse_document(&arena, source, &options);

        if !self.options.allow_raw_html {
            neutralize_raw_html(&arena, root);
        }
        merge_adjacent_text(root);
        for node in scannable_text_nodes(root) {
            self.splice(&arena, node);
        }

        let mut html = Vec::new();
        if let Err(e) = format_html(root, &options, &mut html) {
            tracing::warn!(error = %e, "Markdown serialization failed");
        }
        String::from_utf8_lossy(&html).into_owned()
    }
}

/// Render `source` to HTML, splicing in `resolutions`.
pub fn render_html(source: &str, resolutions: &Resolutions, options: RenderOptions<'_>) -> String {
    Splicer {
        resolutions,
        options,
        expand_tables: true,
    }
    .render(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::Resolution;
    use chrono::Utc;
    use grimoire_domain::{
        ColumnAlignment, EntityLink, LinkTarget, ReferenceTable, ReferenceTableCell,
        ReferenceTableColumn, Slug, StoredRow,
    };
    use std::sync::Arc;

    fn link(id: LinkTarget, name: &str) -> Resolution {
        Resolution::Link(EntityLink {
            id,
            name: name.into(),
        })
    }

    fn turn_undead(cell_value: &str) -> ReferenceTableData {
        ReferenceTableData::assemble(
            ReferenceTable {
                slug: Slug::new("turn-undead").expect("slug"),
                name: "Turn Undead".into(),
                description: None,
                created_at: Utc::now(),
            },
            vec![ReferenceTableColumn {
                column_index: 0,
                header: "Result".into(),
                span: 1,
                alignment: ColumnAlignment::Left,
            }],
            vec![StoredRow {
                row_index: 0,
                label: None,
                cells: vec![ReferenceTableCell {
                    column_index: 0,
                    value: cell_value.into(),
                    col_span: 1,
                    row_span: 1,
                }],
            }],
        )
    }

    fn render(source: &str, resolutions: &Resolutions) -> String {
        let variables = HashMap::new();
        render_html(
            source,
            resolutions,
            RenderOptions {
                variables: &variables,
                allow_raw_html: false,
            },
        )
    }

    #[test]
    fn collects_keys_from_text_but_not_code() {
        let refs = collect_references(
            "Cast {Spell: Fireball} and [Feat: Dodge].\n\n`{Spell: Wish}`\n\n```\n{Spell: Haste}\n```\n\n{Table: turn-undead}",
        );
        assert!(refs.contains(EntityKind::Spell, "fireball"));
        assert!(refs.contains(EntityKind::Feat, "dodge"));
        assert!(refs.contains(EntityKind::ReferenceTable, "turn-undead"));
        assert!(!refs.contains(EntityKind::Spell, "wish"));
        assert!(!refs.contains(EntityKind::Spell, "haste"));
        assert_eq!(refs.len(), 3);
    }

    #[test]
    fn resolved_entities_become_links() {
        let mut resolutions = Resolutions::new();
        resolutions.insert(EntityKind::Spell, "fireball", link(LinkTarget::Id(12), "Fireball"));
        resolutions.insert(
            EntityKind::Trait,
            "darkvision",
            link(LinkTarget::Slug("darkvision".into()), "Darkvision"),
        );

        let html = render(
            "Cast [Spell: Fireball] with {Trait: darkvision} and {Spell: Wish}.",
            &resolutions,
        );
        assert!(html.contains("<a href=\"/spells/12\" class=\"entity-link\">Fireball</a>"));
        assert!(html.contains("<a href=\"/races/traits/darkvision\" class=\"entity-link\">darkvision</a>"));
        assert!(html.contains("<span class=\"entity-unresolved\">Wish</span>"));
    }

    #[test]
    fn lone_table_token_replaces_its_paragraph() {
        let mut resolutions = Resolutions::new();
        resolutions.insert(
            EntityKind::ReferenceTable,
            "turn-undead",
            Resolution::Table(Arc::new(turn_undead("Destroyed"))),
        );

        let html = render("Intro\n\n{Table: turn-undead}\n", &resolutions);
        assert!(html.contains("<table class=\"md-table\""));
        assert!(!html.contains("<p><table"));
        assert!(html.contains(">Destroyed</td>"));
    }

    #[test]
    fn missing_tables_render_an_error_block() {
        let html = render("{Table: nope}", &Resolutions::new());
        assert!(html.contains("<div class=\"reference-table-error\">[Missing table: nope]</div>"));
    }

    #[test]
    fn table_cells_resolve_links_but_not_nested_tables() {
        let mut resolutions = Resolutions::new();
        resolutions.insert(EntityKind::Spell, "fireball", link(LinkTarget::Id(12), "Fireball"));
        resolutions.insert(
            EntityKind::ReferenceTable,
            "turn-undead",
            Resolution::Table(Arc::new(turn_undead("{Spell: Fireball} {Table: other}"))),
        );

        let html = render("{Table: turn-undead}", &resolutions);
        assert!(html.contains("<a href=\"/spells/12\" class=\"entity-link\">Fireball</a>"));
        assert!(html.contains("{Table: other}"));
    }

    #[test]
    fn variables_substitute_and_escape() {
        let mut variables = HashMap::new();
        variables.insert("level".to_string(), "<5>".to_string());
        let html = render_html(
            "Level {var: level}, bonus {var: bonus}",
            &Resolutions::new(),
            RenderOptions {
                variables: &variables,
                allow_raw_html: false,
            },
        );
        assert!(html.contains("Level &lt;5&gt;"));
        assert!(html.contains("bonus [var: bonus]"));
    }

    #[test]
    fn quotes_and_ampersands_are_escaped() {
        assert_eq!(
            escape_html("\"Tom & Jerry\" <3"),
            "&quot;Tom &amp; Jerry&quot; &lt;3"
        );
        assert_eq!(escape_html("Éclat"), "Éclat");
    }

    #[test]
    fn raw_html_is_escaped_unless_allowed() {
        let variables = HashMap::new();
        let source = "Hello <b>world</b>\n\n<div>block</div>\n";

        let escaped = render(source, &Resolutions::new());
        assert!(escaped.contains("&lt;b&gt;world&lt;/b&gt;"));
        assert!(escaped.contains("&lt;div&gt;block&lt;/div&gt;"));

        let raw = render_html(
            source,
            &Resolutions::new(),
            RenderOptions {
                variables: &variables,
                allow_raw_html: true,
            },
        );
        assert!(raw.contains("<b>world</b>"));
        assert!(raw.contains("<div>block</div>"));
    }

    #[test]
    fn table_references_come_from_cells() {
        let table = turn_undead("[Spell: Sleep] or {Table: other}");
        let refs = collect_table_references([&table]);
        assert!(refs.contains(EntityKind::Spell, "sleep"));
        assert_eq!(refs.len(), 1);
    }
}
