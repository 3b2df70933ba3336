use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use grimoire_domain::{
    ColumnAlignment, Page, ReferenceTable, ReferenceTableCell, ReferenceTableColumn,
    ReferenceTableData, ReferenceTableSummary, Slug, StoredRow,
};
use grimoire_shared::{ReferenceTableListQuery, ReferenceTableRequest};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};

use super::query::{db_err, order_by, parsed_column, push_contains, push_page, slug_column};
use crate::infrastructure::ports::{ClockPort, ReferenceTableRepo, RepoError};

const SUMMARY_SELECT: &str = "SELECT t.slug, t.name, t.description, \
     (SELECT COUNT(*) FROM reference_table_columns c WHERE c.table_slug = t.slug) AS column_count, \
     (SELECT COUNT(*) FROM reference_table_rows r WHERE r.table_slug = t.slug) AS row_count \
     FROM reference_tables t WHERE 1=1";

const TABLE_SORTS: &[(&str, &str)] = &[("name", "t.name"), ("slug", "t.slug")];

pub struct SqliteReferenceTableRepo {
    pool: SqlitePool,
    clock: Arc<dyn ClockPort>,
}

impl SqliteReferenceTableRepo {
    pub fn new(pool: SqlitePool, clock: Arc<dyn ClockPort>) -> Self {
        Self { pool, clock }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &ReferenceTableListQuery) {
        push_contains(builder, "t.name", query.name.as_deref());
        push_contains(builder, "t.slug", query.slug.as_deref());
    }

    fn push_slugs(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, slugs: &[Slug]) {
        builder.push(format!(" AND {} IN (", column));
        let mut list = builder.separated(", ");
        for slug in slugs {
            list.push_bind(slug.as_str().to_string());
        }
        list.push_unseparated(")");
    }

    fn row_to_summary(row: &SqliteRow) -> Result<ReferenceTableSummary, sqlx::Error> {
        Ok(ReferenceTableSummary {
            slug: slug_column(row, "slug")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            column_count: row.try_get("column_count")?,
            row_count: row.try_get("row_count")?,
        })
    }

    async fn load_many(&self, slugs: &[Slug]) -> Result<Vec<ReferenceTableData>, sqlx::Error> {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT slug, name, description, created_at FROM reference_tables WHERE 1=1",
        );
        Self::push_slugs(&mut builder, "slug", slugs);
        let table_rows = builder.build().fetch_all(&self.pool).await?;
        if table_rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT table_slug, column_index, header, span, alignment \
             FROM reference_table_columns WHERE 1=1",
        );
        Self::push_slugs(&mut builder, "table_slug", slugs);
        let mut columns: HashMap<String, Vec<ReferenceTableColumn>> = HashMap::new();
        for row in builder.build().fetch_all(&self.pool).await? {
            let alignment: ColumnAlignment = parsed_column(&row, "alignment")?;
            columns
                .entry(row.try_get("table_slug")?)
                .or_default()
                .push(ReferenceTableColumn {
                    column_index: row.try_get("column_index")?,
                    header: row.try_get("header")?,
                    span: row.try_get("span")?,
                    alignment,
                });
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT r.id, r.table_slug, r.row_index, r.label, \
                    c.column_index, c.value, c.col_span, c.row_span \
             FROM reference_table_rows r \
             LEFT JOIN reference_table_cells c ON c.row_id = r.id WHERE 1=1",
        );
        Self::push_slugs(&mut builder, "r.table_slug", slugs);
        builder.push(" ORDER BY r.table_slug, r.row_index, r.id, c.column_index");

        // (table slug, row id, row), one entry per row
        let mut rows: Vec<(String, i64, StoredRow)> = Vec::new();
        for row in builder.build().fetch_all(&self.pool).await? {
            let row_id: i64 = row.try_get("id")?;
            if rows.last().map(|(_, id, _)| *id) != Some(row_id) {
                rows.push((
                    row.try_get("table_slug")?,
                    row_id,
                    StoredRow {
                        row_index: row.try_get("row_index")?,
                        label: row.try_get("label")?,
                        cells: Vec::new(),
                    },
                ));
            }
            let column_index: Option<i64> = row.try_get("column_index")?;
            if let (Some(column_index), Some((_, _, stored))) = (column_index, rows.last_mut()) {
                stored.cells.push(ReferenceTableCell {
                    column_index,
                    value: row.try_get("value")?,
                    col_span: row.try_get("col_span")?,
                    row_span: row.try_get("row_span")?,
                });
            }
        }
        let mut rows_by_table: HashMap<String, Vec<StoredRow>> = HashMap::new();
        for (slug, _, row) in rows {
            rows_by_table.entry(slug).or_default().push(row);
        }

        table_rows
            .iter()
            .map(|row| -> Result<ReferenceTableData, sqlx::Error> {
                let table = ReferenceTable {
                    slug: slug_column(row, "slug")?,
                    name: row.try_get("name")?,
                    description: row.try_get("description")?,
                    created_at: row.try_get("created_at")?,
                };
                let key = table.slug.as_str().to_string();
                Ok(ReferenceTableData::assemble(
                    table,
                    columns.remove(&key).unwrap_or_default(),
                    rows_by_table.remove(&key).unwrap_or_default(),
                ))
            })
            .collect()
    }

    async fn insert_layout(
        conn: &mut SqliteConnection,
        table: &ReferenceTableRequest,
    ) -> Result<(), sqlx::Error> {
        let slug = table.slug.as_str();

        for column in &table.columns {
            sqlx::query(
                "INSERT INTO reference_table_columns \
                 (table_slug, column_index, header, span, alignment) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(slug)
            .bind(column.column_index)
            .bind(&column.header)
            .bind(column.span)
            .bind(column.alignment.as_str())
            .execute(&mut *conn)
            .await?;
        }

        for row in &table.rows {
            let result = sqlx::query(
                "INSERT INTO reference_table_rows (table_slug, row_index, label) VALUES (?, ?, ?)",
            )
            .bind(slug)
            .bind(row.row_index)
            .bind(&row.label)
            .execute(&mut *conn)
            .await?;
            let row_id = result.last_insert_rowid();

            for cell in &row.cells {
                sqlx::query(
                    "INSERT INTO reference_table_cells \
                     (row_id, column_index, value, col_span, row_span) VALUES (?, ?, ?, ?, ?)",
                )
                .bind(row_id)
                .bind(cell.column_index)
                .bind(&cell.value)
                .bind(cell.col_span)
                .bind(cell.row_span)
                .execute(&mut *conn)
                .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReferenceTableRepo for SqliteReferenceTableRepo {
    async fn list(
        &self,
        query: &ReferenceTableListQuery,
    ) -> Result<Page<ReferenceTableSummary>, RepoError> {
        let page = query.page_request();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM reference_tables t WHERE 1=1");
        Self::push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err("count_reference_tables"))?;

        let mut select = QueryBuilder::new(SUMMARY_SELECT);
        Self::push_filters(&mut select, query);
        select.push(order_by(
            query.sort.as_deref(),
            TABLE_SORTS,
            query.sort_order(),
            "t.slug",
        ));
        push_page(&mut select, page);

        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err("list_reference_tables"))?;
        let tables = rows
            .iter()
            .map(Self::row_to_summary)
            .collect::<Result<Vec<_>, _>>()
            .map_err(db_err("list_reference_tables"))?;

        Ok(Page::new(page, total, tables))
    }

    async fn get(&self, slug: &Slug) -> Result<Option<ReferenceTableData>, RepoError> {
        let mut tables = self
            .load_many(std::slice::from_ref(slug))
            .await
            .map_err(db_err("get_reference_table"))?;
        Ok(tables.pop())
    }

    async fn get_many(&self, slugs: &[Slug]) -> Result<Vec<ReferenceTableData>, RepoError> {
        if slugs.is_empty() {
            return Ok(Vec::new());
        }
        self.load_many(slugs)
            .await
            .map_err(db_err("get_reference_tables"))
    }

    async fn create(&self, table: &ReferenceTableRequest) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("create_reference_table"))?;

        sqlx::query(
            "INSERT INTO reference_tables (slug, name, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(table.slug.as_str())
        .bind(&table.name)
        .bind(&table.description)
        .bind(self.clock.now())
        .execute(&mut *tx)
        .await
        .map_err(db_err("create_reference_table"))?;

        Self::insert_layout(&mut tx, table)
            .await
            .map_err(db_err("create_reference_table_layout"))?;
        tx.commit().await.map_err(db_err("create_reference_table"))?;
        Ok(())
    }

    async fn update(&self, slug: &Slug, table: &ReferenceTableRequest) -> Result<(), RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("update_reference_table"))?;

        let result = sqlx::query(
            "UPDATE reference_tables SET slug = ?, name = ?, description = ? WHERE slug = ?",
        )
        .bind(table.slug.as_str())
        .bind(&table.name)
        .bind(&table.description)
        .bind(slug.as_str())
        .execute(&mut *tx)
        .await
        .map_err(db_err("update_reference_table"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("ReferenceTable", slug.as_str()));
        }

        // Cells go with their rows.
        for statement in [
            "DELETE FROM reference_table_columns WHERE table_slug = ?",
            "DELETE FROM reference_table_rows WHERE table_slug = ?",
        ] {
            sqlx::query(statement)
                .bind(table.slug.as_str())
                .execute(&mut *tx)
                .await
                .map_err(db_err("update_reference_table"))?;
        }

        Self::insert_layout(&mut tx, table)
            .await
            .map_err(db_err("update_reference_table_layout"))?;
        tx.commit().await.map_err(db_err("update_reference_table"))?;
        Ok(())
    }

    async fn delete(&self, slug: &Slug) -> Result<(), RepoError> {
        let result = sqlx::query("DELETE FROM reference_tables WHERE slug = ?")
            .bind(slug.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err("delete_reference_table"))?;
        if result.rows_affected() == 0 {
            return Err(RepoError::not_found("ReferenceTable", slug.as_str()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sqlite::testing;
    use serde_json::json;

    fn slug(s: &str) -> Slug {
        Slug::new(s).expect("slug")
    }

    fn turn_undead(slug: &str, rows: serde_json::Value) -> ReferenceTableRequest {
        serde_json::from_value(json!({
            "name": "Turn Undead",
            "slug": slug,
            "columns": [
                { "columnIndex": 0, "header": "Check" },
                { "columnIndex": 1, "header": "Most Powerful Affected", "alignment": "center" }
            ],
            "rows": rows
        }))
        .expect("request")
    }

    fn rows() -> serde_json::Value {
        json!([
            { "rowIndex": 1, "cells": [
                { "columnIndex": 0, "value": "1-3" },
                { "columnIndex": 1, "value": "Cleric's level -4" }
            ]},
            { "rowIndex": 0, "label": "low", "cells": [
                { "columnIndex": 0, "value": "0 or lower", "colSpan": 2 }
            ]}
        ])
    }

    fn repo(pool: SqlitePool) -> SqliteReferenceTableRepo {
        SqliteReferenceTableRepo::new(pool, testing::clock())
    }

    #[tokio::test]
    async fn create_and_read_layout() {
        let repo = repo(testing::pool().await);
        repo.create(&turn_undead("turn-undead", rows()))
            .await
            .expect("create");

        let data = repo
            .get(&slug("turn-undead"))
            .await
            .expect("get")
            .expect("exists");
        assert_eq!(data.headers.len(), 2);
        assert_eq!(data.headers[1].alignment, ColumnAlignment::Center);
        assert_eq!(data.rows[0].label.as_deref(), Some("low"));
        assert_eq!(
            data.rows[0].cells[0].as_ref().map(|c| c.col_span),
            Some(2)
        );
        assert!(data.rows[0].cells[1].is_none());
        assert_eq!(
            ReferenceTableData::cell(&data.rows[1], 1).map(|c| c.value.as_str()),
            Some("Cleric's level -4")
        );
    }

    #[tokio::test]
    async fn update_replaces_everything() {
        let repo = repo(testing::pool().await);
        repo.create(&turn_undead("turn-undead", rows()))
            .await
            .expect("create");

        let replacement = turn_undead(
            "turning",
            json!([{ "rowIndex": 0, "cells": [{ "columnIndex": 1, "value": "only" }] }]),
        );
        repo.update(&slug("turn-undead"), &replacement)
            .await
            .expect("update");

        assert!(repo
            .get(&slug("turn-undead"))
            .await
            .expect("get")
            .is_none());
        let data = repo
            .get(&slug("turning"))
            .await
            .expect("get")
            .expect("renamed");
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.rows[0].cells[1].as_ref().map(|c| c.value.as_str()), Some("only"));

        let cells: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reference_table_cells")
            .fetch_one(&repo.pool)
            .await
            .expect("count");
        assert_eq!(cells, 1);
    }

    #[tokio::test]
    async fn list_reports_counts() {
        let repo = repo(testing::pool().await);
        repo.create(&turn_undead("turn-undead", rows()))
            .await
            .expect("create");
        repo.create(&turn_undead("empty-table", json!([])))
            .await
            .expect("create");

        let page = repo
            .list(&ReferenceTableListQuery {
                slug: Some("turn".into()),
                ..Default::default()
            })
            .await
            .expect("list");
        assert_eq!(page.total, 1);
        assert_eq!(page.results[0].column_count, 2);
        assert_eq!(page.results[0].row_count, 2);
    }

    #[tokio::test]
    async fn get_many_skips_missing_slugs() {
        let repo = repo(testing::pool().await);
        repo.create(&turn_undead("turn-undead", rows()))
            .await
            .expect("create");

        let tables = repo
            .get_many(&[slug("turn-undead"), slug("missing")])
            .await
            .expect("get_many");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].table.name, "Turn Undead");

        repo.delete(&slug("turn-undead")).await.expect("delete");
        assert!(repo
            .delete(&slug("turn-undead"))
            .await
            .is_err_and(|e| e.is_not_found()));
    }
}
