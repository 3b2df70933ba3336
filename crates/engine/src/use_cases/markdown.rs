//! Render rules text to HTML.

use std::collections::HashMap;
use std::sync::Arc;

use grimoire_shared::RenderMarkdownRequest;

use crate::markdown::{collect_references, collect_table_references, render_html, RenderOptions};

use super::resolve::{ResolveEntities, ResolveError};

pub struct RenderMarkdown {
    resolver: Arc<ResolveEntities>,
}

impl RenderMarkdown {
    pub fn new(resolver: Arc<ResolveEntities>) -> Self {
        Self { resolver }
    }

    /// Resolve every reference in one batch, then a second batch for links
    /// found inside embedded tables, then render.
    pub async fn execute(&self, request: &RenderMarkdownRequest) -> Result<String, ResolveError> {
        let refs = collect_references(&request.markdown);
        let mut resolutions = self.resolver.resolve(&refs).await?;

        let nested = collect_table_references(resolutions.tables()).difference(&refs);
        if !nested.is_empty() {
            tracing::debug!(keys = nested.len(), "Resolving references inside tables");
            resolutions.extend(self.resolver.resolve(&nested).await?);
        }

        // Variable tokens are matched case-insensitively.
        let variables: HashMap<String, String> = request
            .variables
            .iter()
            .map(|(name, value)| (name.to_lowercase(), value.clone()))
            .collect();

        Ok(render_html(
            &request.markdown,
            &resolutions,
            RenderOptions {
                variables: &variables,
                allow_raw_html: request.allow_raw_html,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cache::TtlCache;
    use crate::infrastructure::ports::{MockEntityLookupRepo, MockReferenceTableRepo};
    use chrono::Utc;
    use grimoire_domain::{
        ColumnAlignment, EntityKind, EntityLink, LinkTarget, ReferenceTable, ReferenceTableCell,
        ReferenceTableColumn, ReferenceTableData, Slug, StoredRow,
    };
    use std::time::Duration;

    fn table_with_cell(value: &str) -> ReferenceTableData {
        ReferenceTableData::assemble(
            ReferenceTable {
                slug: Slug::new("spells-per-day").expect("slug"),
                name: "Spells per Day".into(),
                description: None,
                created_at: Utc::now(),
            },
            vec![ReferenceTableColumn {
                column_index: 0,
                header: "Spell".into(),
                span: 1,
                alignment: ColumnAlignment::Left,
            }],
            vec![StoredRow {
                row_index: 0,
                label: None,
                cells: vec![ReferenceTableCell {
                    column_index: 0,
                    value: value.into(),
                    col_span: 1,
                    row_span: 1,
                }],
            }],
        )
    }

    #[tokio::test]
    async fn links_inside_tables_resolve_in_a_second_batch() {
        let mut entities = MockEntityLookupRepo::new();
        entities
            .expect_find_links()
            .withf(|kind, keys| *kind == EntityKind::Spell && keys == ["fireball".to_string()])
            .times(1)
            .returning(|_, _| {
                Ok(vec![EntityLink {
                    id: LinkTarget::Id(12),
                    name: "Fireball".into(),
                }])
            });
        entities
            .expect_find_links()
            .withf(|kind, keys| *kind == EntityKind::Spell && keys == ["sleep".to_string()])
            .times(1)
            .returning(|_, _| {
                Ok(vec![EntityLink {
                    id: LinkTarget::Id(30),
                    name: "Sleep".into(),
                }])
            });
        let mut tables = MockReferenceTableRepo::new();
        tables
            .expect_get_many()
            .times(1)
            .returning(|_| Ok(vec![table_with_cell("{Spell: Sleep}")]));

        let resolver = Arc::new(ResolveEntities::new(
            Arc::new(entities),
            Arc::new(tables),
            Arc::new(TtlCache::new(Duration::from_secs(60))),
        ));
        let html = RenderMarkdown::new(resolver)
            .execute(&RenderMarkdownRequest {
                markdown: "Cast {Spell: Fireball}.\n\n{Table: spells-per-day}\n".into(),
                variables: HashMap::new(),
                allow_raw_html: false,
            })
            .await
            .expect("render");

        assert!(html.contains("<a href=\"/spells/12\" class=\"entity-link\">Fireball</a>"));
        assert!(html.contains("<a href=\"/spells/30\" class=\"entity-link\">Sleep</a>"));
        assert!(html.contains("<table class=\"md-table\""));
    }

    #[tokio::test]
    async fn plain_text_needs_no_lookups() {
        let resolver = Arc::new(ResolveEntities::new(
            Arc::new(MockEntityLookupRepo::new()),
            Arc::new(MockReferenceTableRepo::new()),
            Arc::new(TtlCache::new(Duration::from_secs(60))),
        ));
        let html = RenderMarkdown::new(resolver)
            .execute(&RenderMarkdownRequest {
                markdown: "Just **bold** text".into(),
                variables: HashMap::new(),
                allow_raw_html: false,
            })
            .await
            .expect("render");
        assert_eq!(html.trim(), "<p>Just <strong>bold</strong> text</p>");
    }

    #[tokio::test]
    async fn variable_names_ignore_case() {
        let resolver = Arc::new(ResolveEntities::new(
            Arc::new(MockEntityLookupRepo::new()),
            Arc::new(MockReferenceTableRepo::new()),
            Arc::new(TtlCache::new(Duration::from_secs(60))),
        ));
        let html = RenderMarkdown::new(resolver)
            .execute(&RenderMarkdownRequest {
                markdown: "Caster level {var: Level}, DC {var: dc}".into(),
                variables: HashMap::from([
                    ("level".to_string(), "5".to_string()),
                    ("DC".to_string(), "15".to_string()),
                ]),
                allow_raw_html: false,
            })
            .await
            .expect("render");
        assert_eq!(html.trim(), "<p>Caster level 5, DC 15</p>");
    }
}
