//! HTML rendering of reference tables.

use std::collections::HashSet;
use std::fmt::Write;

use grimoire_domain::{ReferenceTableData, ReferenceTableRow};

use super::render::escape_html;

/// Widest column in `ch`, and the cell length past which text wraps.
pub const MAX_COLUMN_WIDTH: usize = 80;

const TABLE_CLASS: &str = "md-table";

/// Length of a cell value with basic markdown punctuation removed.
pub fn plain_text_len(value: &str) -> usize {
    value
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '[' | ']' | '(' | ')' | '`' | '~' | '^'))
        .count()
}

fn column_width(data: &ReferenceTableData, column_index: i64) -> usize {
    data.rows
        .iter()
        .filter_map(|row| ReferenceTableData::cell(row, column_index))
        .filter(|cell| cell.col_span <= 1)
        .map(|cell| plain_text_len(&cell.value))
        .max()
        .unwrap_or(0)
        .min(MAX_COLUMN_WIDTH)
}

/// Render `data` as a `<table>`.
///
/// `cell_html` turns a cell or header value into inline HTML.
pub fn render_table(data: &ReferenceTableData, cell_html: &dyn Fn(&str) -> String) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<table class=\"{}\" data-table=\"{}\">",
        TABLE_CLASS,
        escape_html(data.table.slug.as_str())
    );

    out.push_str("<colgroup>");
    for header in &data.headers {
        let _ = write!(
            out,
            "<col style=\"width: {}ch\" />",
            column_width(data, header.column_index)
        );
    }
    out.push_str("</colgroup>");

    out.push_str("<thead><tr>");
    for header in &data.headers {
        let _ = write!(
            out,
            "<th style=\"text-align: {}\">{}</th>",
            header.alignment,
            cell_html(&header.header)
        );
    }
    out.push_str("</tr></thead>");

    out.push_str("<tbody>");
    let mut occupied: HashSet<(usize, i64)> = HashSet::new();
    for (position, row) in data.rows.iter().enumerate() {
        out.push_str("<tr>");
        render_row(&mut out, data, row, position, &mut occupied, cell_html);
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out
}

fn render_row(
    out: &mut String,
    data: &ReferenceTableData,
    row: &ReferenceTableRow,
    position: usize,
    occupied: &mut HashSet<(usize, i64)>,
    cell_html: &dyn Fn(&str) -> String,
) {
    for header in &data.headers {
        let column = header.column_index;
        if occupied.contains(&(position, column)) {
            continue;
        }

        let cell = ReferenceTableData::cell(row, column);
        let value = cell.map_or("", |c| c.value.as_str());
        let col_span = cell.map_or(1, |c| c.col_span.max(1));
        let row_span = cell.map_or(1, |c| c.row_span.max(1));

        for r in 0..usize::try_from(row_span).unwrap_or(1) {
            for c in 0..col_span {
                occupied.insert((position + r, column + c));
            }
        }

        let white_space = if plain_text_len(value) > MAX_COLUMN_WIDTH {
            "normal"
        } else {
            "nowrap"
        };
        let _ = write!(
            out,
            "<td style=\"text-align: {}; white-space: {}\"",
            header.alignment, white_space
        );
        if col_span > 1 {
            let _ = write!(out, " colspan=\"{}\"", col_span);
        }
        if row_span > 1 {
            let _ = write!(out, " rowspan=\"{}\"", row_span);
        }
        let _ = write!(out, ">{}</td>", cell_html(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grimoire_domain::{
        ColumnAlignment, ReferenceTable, ReferenceTableCell, ReferenceTableColumn, Slug,
        StoredRow,
    };

    fn column(index: i64, header: &str, alignment: ColumnAlignment) -> ReferenceTableColumn {
        ReferenceTableColumn {
            column_index: index,
            header: header.into(),
            span: 1,
            alignment,
        }
    }

    fn cell(index: i64, value: &str, col_span: i64, row_span: i64) -> ReferenceTableCell {
        ReferenceTableCell {
            column_index: index,
            value: value.into(),
            col_span,
            row_span,
        }
    }

    fn data(rows: Vec<StoredRow>) -> ReferenceTableData {
        ReferenceTableData::assemble(
            ReferenceTable {
                slug: Slug::new("turn-undead").expect("slug"),
                name: "Turn Undead".into(),
                description: None,
                created_at: Utc::now(),
            },
            vec![
                column(0, "Check", ColumnAlignment::Left),
                column(1, "Result", ColumnAlignment::Center),
            ],
            rows,
        )
    }

    fn row(index: i64, cells: Vec<ReferenceTableCell>) -> StoredRow {
        StoredRow {
            row_index: index,
            label: None,
            cells,
        }
    }

    fn identity(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn plain_length_ignores_markdown_punctuation() {
        assert_eq!(plain_text_len("**bold**"), 4);
        assert_eq!(plain_text_len("[link](x)"), 5);
    }

    #[test]
    fn column_widths_follow_the_longest_unspanned_cell() {
        let html = render_table(
            &data(vec![
                row(0, vec![cell(0, "*short*", 1, 1), cell(1, "a", 1, 1)]),
                row(1, vec![cell(0, "a much longer spanning value", 2, 1)]),
            ]),
            &identity,
        );
        assert!(html.contains("<col style=\"width: 5ch\" /><col style=\"width: 1ch\" />"));
    }

    #[test]
    fn widths_are_capped() {
        let long = "x".repeat(120);
        let html = render_table(&data(vec![row(0, vec![cell(0, &long, 1, 1)])]), &identity);
        assert!(html.contains("width: 80ch"));
        assert!(html.contains("white-space: normal"));
    }

    #[test]
    fn headers_and_cells_follow_column_alignment() {
        let html = render_table(
            &data(vec![row(0, vec![cell(0, "0", 1, 1), cell(1, "Easy", 1, 1)])]),
            &identity,
        );
        assert!(html.contains("<th style=\"text-align: center\">Result</th>"));
        assert!(html.contains("<td style=\"text-align: center; white-space: nowrap\">Easy</td>"));
    }

    #[test]
    fn spans_skip_covered_cells() {
        let html = render_table(
            &data(vec![
                row(0, vec![cell(0, "tall", 1, 2), cell(1, "r0", 1, 1)]),
                row(1, vec![cell(0, "hidden", 1, 1), cell(1, "r1", 1, 1)]),
            ]),
            &identity,
        );
        assert!(html.contains("rowspan=\"2\">tall</td>"));
        assert!(!html.contains("hidden"));
        assert!(html.contains(">r1</td>"));
        assert_eq!(html.matches("<td").count(), 3);
    }

    #[test]
    fn missing_cells_render_empty() {
        let html = render_table(&data(vec![row(0, vec![cell(1, "only", 1, 1)])]), &identity);
        assert!(html.contains("white-space: nowrap\"></td>"));
    }
}
