use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::QueryStatus;

/// Column of a result table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column name from the CSV header.
    pub name: String,
    /// Athena type name inferred from the values ("bigint", "double", "boolean", "varchar", ...).
    pub data_type: String,
}

/// Execution metadata for a completed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryMetadata {
    /// Athena query execution ID.
    pub query_id: String,
    /// Final execution state.
    pub state: QueryStatus,
    /// Total bytes scanned during execution.
    pub bytes_scanned: u64,
    /// Engine execution time in milliseconds.
    pub execution_time_ms: u64,
    /// Output location Athena recorded for the execution, if reported.
    pub output_location: Option<String>,
    /// `s3://bucket/key` the table was read from.
    pub result_uri: String,
    pub completed_at: DateTime<Utc>,
}

/// Tabular result of a query, read back from its result CSV.
///
/// Rows are stored as `Vec<Option<String>>` where `None` represents an empty cell.
/// Column ordering in each row matches the `columns` vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Column definitions in header order.
    pub columns: Vec<TableColumn>,
    /// Row data. Each inner vector has the same length as `columns`.
    pub rows: Vec<Vec<Option<String>>>,
    /// Query execution metadata.
    pub metadata: QueryMetadata,
}

/// Athena pricing: $5 per TB scanned.
const DOLLARS_PER_BYTE: f64 = 5.0 / (1024.0 * 1024.0 * 1024.0 * 1024.0);

impl ResultTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names in header order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Finds the zero-based index of a column by name (case-sensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Retrieves the value at the given row index and column name.
    ///
    /// Returns `None` if the row index is out of bounds, the column name
    /// does not exist, or the cell is empty.
    pub fn get_value(&self, row: usize, col: &str) -> Option<&str> {
        let col_idx = self.column_index(col)?;
        let row_data = self.rows.get(row)?;
        row_data.get(col_idx)?.as_deref()
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, col: &str) -> Option<Vec<Option<&str>>> {
        let col_idx = self.column_index(col)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(col_idx).and_then(|v| v.as_deref()))
                .collect(),
        )
    }

    /// Estimates the query cost in USD based on Athena's $5/TB pricing model.
    pub fn cost_estimate_usd(&self) -> f64 {
        self.metadata.bytes_scanned as f64 * DOLLARS_PER_BYTE
    }
}

impl fmt::Display for ResultTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "(empty result set)");
        }

        // Widths in chars, matching how `{:<width$}` pads.
        let mut widths: Vec<usize> = self
            .columns
            .iter()
            .map(|c| c.name.chars().count())
            .collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.as_deref().unwrap_or("NULL").chars().count());
                }
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{:<width$}", col.name, width = widths[i])?;
        }
        writeln!(f)?;

        for (i, w) in widths.iter().enumerate() {
            if i > 0 {
                write!(f, "-+-")?;
            }
            write!(f, "{}", "-".repeat(*w))?;
        }
        writeln!(f)?;

        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(widths.len()) {
                if i > 0 {
                    write!(f, " | ")?;
                }
                let value = cell.as_deref().unwrap_or("NULL");
                write!(f, "{:<width$}", value, width = widths[i])?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(
            f,
            "Query {} | {} rows | {:.3} MB scanned | {}ms | ${:.6}",
            self.metadata.query_id,
            self.rows.len(),
            self.metadata.bytes_scanned as f64 / (1024.0 * 1024.0),
            self.metadata.execution_time_ms,
            self.cost_estimate_usd(),
        )
    }
}
