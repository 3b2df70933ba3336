use std::borrow::Cow;
use std::collections::HashSet;

use grimoire_domain::{ColumnAlignment, Slug};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

fn one() -> i64 {
    1
}

/// Body of `POST /api/referencetables` and `PUT /api/referencetables/{slug}`.
///
/// An update replaces every column, row and cell of the table.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_layout"))]
pub struct ReferenceTableRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be between 1 and 200 characters"))]
    pub name: String,
    pub slug: Slug,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(
        length(min = 1, max = 20, message = "A table needs between 1 and 20 columns"),
        nested
    )]
    pub columns: Vec<ReferenceTableColumnRequest>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "A table can have at most 1000 rows"), nested)]
    pub rows: Vec<ReferenceTableRowRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableColumnRequest {
    #[validate(range(min = 0, max = 19))]
    pub column_index: i64,
    #[validate(length(max = 200))]
    pub header: String,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 10))]
    pub span: i64,
    #[serde(default)]
    pub alignment: ColumnAlignment,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableRowRequest {
    #[validate(range(min = 0))]
    pub row_index: i64,
    #[validate(length(max = 200))]
    pub label: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub cells: Vec<ReferenceTableCellRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceTableCellRequest {
    #[validate(range(min = 0, max = 19))]
    pub column_index: i64,
    #[validate(length(max = 1000, message = "Cell values must be at most 1000 characters"))]
    pub value: String,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 10))]
    pub col_span: i64,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 10))]
    pub row_span: i64,
}

fn layout_error(code: &'static str, message: String) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Owned(message));
    err
}

/// Column and row indices are unique, and every cell sits in a declared column.
fn validate_layout(table: &ReferenceTableRequest) -> Result<(), ValidationError> {
    let mut columns = HashSet::new();
    for column in &table.columns {
        if !columns.insert(column.column_index) {
            return Err(layout_error(
                "duplicate_column",
                format!("Duplicate column index {}", column.column_index),
            ));
        }
    }

    let mut rows = HashSet::new();
    for row in &table.rows {
        if !rows.insert(row.row_index) {
            return Err(layout_error(
                "duplicate_row",
                format!("Duplicate row index {}", row.row_index),
            ));
        }
        let mut seen = HashSet::new();
        for cell in &row.cells {
            if !columns.contains(&cell.column_index) {
                return Err(layout_error(
                    "unknown_column",
                    format!(
                        "Row {} has a cell in undeclared column {}",
                        row.row_index, cell.column_index
                    ),
                ));
            }
            if !seen.insert(cell.column_index) {
                return Err(layout_error(
                    "duplicate_cell",
                    format!(
                        "Row {} has two cells in column {}",
                        row.row_index, cell.column_index
                    ),
                ));
            }
        }
    }
    Ok(())
}
