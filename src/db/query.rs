//! Generic read-only query surface for the template front ends.
//!
//! External renderers build their own SELECTs; the engine runs them
//! with bound parameters and hands every cell back as text, NULL
//! rendered as the empty string. Row and column order are preserved
//! exactly as SQLite returns them.

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::db::Store;
use crate::error::StoreError;

fn row_to_cells(row: &SqliteRow) -> Result<Vec<String>, StoreError> {
    let mut cells = Vec::with_capacity(row.columns().len());
    for i in 0..row.columns().len() {
        // unchecked: SQLite converts any value to its text form, and
        // the caller gets text regardless of the declared column type
        let cell: Option<String> = row.try_get_unchecked(i)?;
        cells.push(cell.unwrap_or_default());
    }
    Ok(cells)
}

impl Store {
    /// Runs an arbitrary read query, binding `args` as text
    /// parameters, and returns all rows as text cells.
    pub async fn query_rows(
        &self,
        sql: &str,
        args: &[&str],
    ) -> Result<Vec<Vec<String>>, StoreError> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = query.bind(*arg);
        }
        let rows = query.fetch_all(self.pool()).await?;

        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            result.push(row_to_cells(row)?);
        }
        Ok(result)
    }

    /// Like [`Store::query_rows`] but only the first row, or `None`
    /// when the result set is empty.
    pub async fn query_row(
        &self,
        sql: &str,
        args: &[&str],
    ) -> Result<Option<Vec<String>>, StoreError> {
        let mut query = sqlx::query(sql);
        for arg in args {
            query = query.bind(*arg);
        }
        let row = query.fetch_optional(self.pool()).await?;
        row.as_ref().map(row_to_cells).transpose()
    }
}
