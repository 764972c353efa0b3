//! Reduction of per-cell metadata to what the column header does not already say.

use crate::model::{ColumnMapping, ResultColumn};
use crate::value::Value;

/// Metadata entries of `cell` that must be written next to its value.
///
/// Columns without row-computed attributes never carry overrides. Otherwise
/// every metadata key absent from the header is kept, in the cell's order;
/// values are never compared, so a row-computed key is re-emitted even when
/// it matches the previous row or is null.
pub fn overrides<'a>(mapping: &ColumnMapping, cell: &'a ResultColumn) -> Vec<(&'a str, &'a Value)> {
    if !mapping.has_computed_attributes() {
        return Vec::new();
    }
    cell.metadata()
        .iter()
        .filter(|(key, _)| !mapping.attributes().contains_key(key.as_str()))
        .map(|(key, value)| (key.as_str(), value))
        .collect()
}
