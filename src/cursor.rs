//! Row cursor contract and an in-memory implementation.

use crate::error::Result;
use crate::model::{ColumnMapping, ResultColumn};
use crate::value::ValueMap;

/// Forward-only cursor over the rows of a query result.
///
/// Cells are addressed by zero-based column position and are valid until the
/// next call to [`ResultCursor::advance`].
pub trait ResultCursor {
    /// Column mappings in output order.
    fn columns(&self) -> &[ColumnMapping];

    /// Number of cells in each row.
    fn column_count(&self) -> usize {
        self.columns().len()
    }

    /// Attributes declared for the result as a whole.
    fn result_attributes(&self) -> Option<&ValueMap> {
        None
    }

    /// Name of the primary table the query reads from, when there is one.
    fn source_table(&self) -> Option<&str> {
        None
    }

    /// Moves to the next row; returns false once the rows are exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Cell at `column` in the current row.
    fn cell(&self, column: usize) -> Option<&ResultColumn>;
}

/// Cursor over rows held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryCursor {
    columns: Vec<ColumnMapping>,
    attributes: Option<ValueMap>,
    source_table: Option<String>,
    rows: Vec<Vec<ResultColumn>>,
    position: Option<usize>,
}

impl MemoryCursor {
    /// Creates a cursor with the given columns and no rows.
    pub fn new(columns: Vec<ColumnMapping>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Sets the result-level attributes.
    pub fn with_attributes(mut self, attributes: ValueMap) -> Self {
        self.attributes = Some(attributes);
        self
    }

    /// Sets the primary source table name.
    pub fn with_source_table(mut self, table: impl Into<String>) -> Self {
        self.source_table = Some(table.into());
        self
    }

    /// Appends a row.
    pub fn with_row(mut self, row: Vec<ResultColumn>) -> Self {
        self.rows.push(row);
        self
    }

    /// Appends several rows.
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Vec<ResultColumn>>) -> Self {
        self.rows.extend(rows);
        self
    }
}

impl ResultCursor for MemoryCursor {
    fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    fn result_attributes(&self) -> Option<&ValueMap> {
        self.attributes.as_ref()
    }

    fn source_table(&self) -> Option<&str> {
        self.source_table.as_deref()
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.position.map_or(0, |pos| pos.saturating_add(1).min(self.rows.len()));
        self.position = Some(next);
        Ok(next < self.rows.len())
    }

    fn cell(&self, column: usize) -> Option<&ResultColumn> {
        self.position
            .and_then(|pos| self.rows.get(pos))
            .and_then(|row| row.get(column))
    }
}
