//! Helpers shared by the SQLite repositories.

use std::str::FromStr;

use grimoire_domain::{PageRequest, Slug, SortOrder};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::infrastructure::ports::RepoError;

/// Map a sqlx error to a [`RepoError`], keeping constraint failures apart.
pub(super) fn db_err(operation: &'static str) -> impl Fn(sqlx::Error) -> RepoError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return RepoError::conflict(db.message());
            }
            if db.is_foreign_key_violation() {
                return RepoError::constraint(db.message());
            }
        }
        RepoError::database(operation, e)
    }
}

/// Lookup key stored next to a name. Folded in Rust because SQLite's
/// `lower()` only folds ASCII.
pub(super) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `%value%` with LIKE wildcards escaped. Use with `ESCAPE '\'`.
pub(super) fn like_pattern(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Append `AND <column> LIKE '%value%'` when a filter is set.
pub(super) fn push_contains(
    builder: &mut QueryBuilder<'_, Sqlite>,
    column: &str,
    value: Option<&str>,
) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        builder
            .push(format!(" AND {} LIKE ", column))
            .push_bind(like_pattern(value))
            .push(" ESCAPE '\\'");
    }
}

/// Append `AND <column> = value` when a filter is set.
pub(super) fn push_eq<T>(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, value: Option<T>)
where
    T: for<'q> sqlx::Encode<'q, Sqlite> + sqlx::Type<Sqlite> + Send + 'static,
{
    if let Some(value) = value {
        builder
            .push(format!(" AND {} = ", column))
            .push_bind(value);
    }
}

/// Append `AND <column> IN (...)` for a non-empty list.
pub(super) fn push_in(builder: &mut QueryBuilder<'_, Sqlite>, column: &str, values: &[i64]) {
    if values.is_empty() {
        return;
    }
    builder.push(format!(" AND {} IN (", column));
    let mut list = builder.separated(", ");
    for value in values {
        list.push_bind(*value);
    }
    list.push_unseparated(")");
}

/// `ORDER BY` clause for a requested sort key.
///
/// `allowed` maps API sort keys to SQL expressions; the first entry is the
/// fallback for unknown or missing keys. `tiebreak` keeps paging stable.
pub(super) fn order_by(
    requested: Option<&str>,
    allowed: &[(&str, &'static str)],
    order: SortOrder,
    tiebreak: &str,
) -> String {
    let column = requested
        .and_then(|key| allowed.iter().find(|(name, _)| *name == key))
        .or_else(|| allowed.first())
        .map_or("name", |(_, column)| *column);
    format!(
        " ORDER BY {} {}, {} ASC",
        column,
        order.as_sql(),
        tiebreak
    )
}

pub(super) fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, page: PageRequest) {
    builder
        .push(" LIMIT ")
        .push_bind(i64::from(page.limit()))
        .push(" OFFSET ")
        .push_bind(i64::from(page.offset()));
}

/// Read a slug column, failing the decode if it holds an invalid slug.
pub(super) fn slug_column(row: &SqliteRow, column: &str) -> Result<Slug, sqlx::Error> {
    let raw: String = row.try_get(column)?;
    Slug::new(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Read a text column and parse it.
pub(super) fn parsed_column<T>(row: &SqliteRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
