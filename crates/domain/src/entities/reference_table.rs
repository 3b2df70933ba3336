//! Reference tables: structured tables embedded into rules text.
//!
//! A table is stored as columns, rows and sparse cells. Readers get a
//! [`ReferenceTableData`], where each row's cells are laid out by column
//! index with gaps where no cell exists (either because it was never written
//! or because a neighbouring cell spans over it).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::Slug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTable {
    pub slug: Slug,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// List view of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableSummary {
    pub slug: Slug,
    pub name: String,
    pub description: Option<String>,
    pub column_count: i64,
    pub row_count: i64,
}

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl ColumnAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for ColumnAlignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnAlignment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(DomainError::parse(format!("Unknown column alignment: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableColumn {
    pub column_index: i64,
    pub header: String,
    pub span: i64,
    pub alignment: ColumnAlignment,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableCell {
    pub column_index: i64,
    pub value: String,
    pub col_span: i64,
    pub row_span: i64,
}

/// A stored row with its sparse cells, as read from persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub row_index: i64,
    pub label: Option<String>,
    pub cells: Vec<ReferenceTableCell>,
}

/// A row laid out for display: `cells[i]` is the cell at column index `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableRow {
    pub row_index: i64,
    pub label: Option<String>,
    pub cells: Vec<Option<ReferenceTableCell>>,
}

/// A complete table ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableData {
    pub table: ReferenceTable,
    /// Ordered by column index
    pub headers: Vec<ReferenceTableColumn>,
    /// Ordered by row index
    pub rows: Vec<ReferenceTableRow>,
}

impl ReferenceTableData {
    /// Lay out stored columns and rows.
    ///
    /// Headers and rows are sorted by index. Every row gets a cell vector
    /// long enough to address the highest column index; cells pointing past
    /// it or at a negative index are dropped.
    pub fn assemble(
        table: ReferenceTable,
        mut columns: Vec<ReferenceTableColumn>,
        mut rows: Vec<StoredRow>,
    ) -> Self {
        columns.sort_by_key(|c| c.column_index);
        rows.sort_by_key(|r| r.row_index);

        let width = columns
            .iter()
            .map(|c| c.column_index)
            .max()
            .map_or(0, |max| usize::try_from(max + 1).unwrap_or(0));

        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<ReferenceTableCell>> = vec![None; width];
                for cell in row.cells {
                    let Ok(index) = usize::try_from(cell.column_index) else {
                        continue;
                    };
                    if let Some(slot) = cells.get_mut(index) {
                        *slot = Some(cell);
                    }
                }
                ReferenceTableRow {
                    row_index: row.row_index,
                    label: row.label,
                    cells,
                }
            })
            .collect();

        Self {
            table,
            headers: columns,
            rows,
        }
    }

    /// The cell at `column_index` of `row`, if present.
    pub fn cell(row: &ReferenceTableRow, column_index: i64) -> Option<&ReferenceTableCell> {
        usize::try_from(column_index)
            .ok()
            .and_then(|i| row.cells.get(i))
            .and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReferenceTable {
        ReferenceTable {
            slug: Slug::new("turn-undead").expect("slug"),
            name: "Turn Undead".into(),
            description: None,
            created_at: Utc::now(),
        }
    }

    fn column(index: i64, header: &str) -> ReferenceTableColumn {
        ReferenceTableColumn {
            column_index: index,
            header: header.into(),
            span: 1,
            alignment: ColumnAlignment::Left,
        }
    }

    fn cell(index: i64, value: &str) -> ReferenceTableCell {
        ReferenceTableCell {
            column_index: index,
            value: value.into(),
            col_span: 1,
            row_span: 1,
        }
    }

    #[test]
    fn assemble_orders_and_positions_cells() {
        let data = ReferenceTableData::assemble(
            table(),
            vec![column(1, "Result"), column(0, "Check")],
            vec![
                StoredRow {
                    row_index: 2,
                    label: None,
                    cells: vec![cell(1, "Hard")],
                },
                StoredRow {
                    row_index: 1,
                    label: Some("first".into()),
                    cells: vec![cell(1, "Easy"), cell(0, "0 or lower")],
                },
            ],
        );

        assert_eq!(data.headers[0].header, "Check");
        assert_eq!(data.rows[0].row_index, 1);
        assert_eq!(data.rows[0].cells.len(), 2);
        assert_eq!(
            ReferenceTableData::cell(&data.rows[0], 0).map(|c| c.value.as_str()),
            Some("0 or lower")
        );
        assert!(data.rows[1].cells[0].is_none());
    }

    #[test]
    fn assemble_drops_out_of_range_cells() {
        let data = ReferenceTableData::assemble(
            table(),
            vec![column(0, "Only")],
            vec![StoredRow {
                row_index: 0,
                label: None,
                cells: vec![cell(3, "stray"), cell(-1, "negative")],
            }],
        );
        assert_eq!(data.rows[0].cells, vec![None]);
    }

    #[test]
    fn alignment_parses_case_insensitively() {
        assert_eq!("Center".parse::<ColumnAlignment>(), Ok(ColumnAlignment::Center));
        assert!("justify".parse::<ColumnAlignment>().is_err());
    }
}
