//! Read-only views of relations, columns, and result cells handed to the encoder.

use std::sync::Arc;

use indexmap::IndexSet;

use crate::expression::Expression;
use crate::value::{Value, ValueMap};

/// Attribute reserved for row identity; never emitted as metadata.
pub const ID_ATTRIBUTE: &str = "_id";

/// Attribute naming the relation a document describes.
pub const TYPE_ATTRIBUTE: &str = "type";

/// Separator marking nested (internal) column names.
pub const PATH_SEPARATOR: char = '/';

/// Named column of a relation, stored or derived from an expression.
#[derive(Clone, Debug)]
pub struct Column {
    name: String,
    expression: Option<Arc<dyn Expression>>,
    attributes: ValueMap,
}

impl Column {
    /// Stored column with no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: None,
            attributes: ValueMap::new(),
        }
    }

    /// Column computed from `expression`.
    pub fn derived(name: impl Into<String>, expression: impl Expression + 'static) -> Self {
        Self::derived_from(name, Arc::new(expression))
    }

    /// Column computed from a shared expression.
    pub fn derived_from(name: impl Into<String>, expression: Arc<dyn Expression>) -> Self {
        Self {
            name: name.into(),
            expression: Some(expression),
            attributes: ValueMap::new(),
        }
    }

    /// Adds (or replaces) an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the column is backed by an expression.
    pub fn is_derived(&self) -> bool {
        self.expression.is_some()
    }

    /// Expression of a derived column.
    pub fn expression(&self) -> Option<&dyn Expression> {
        self.expression.as_deref()
    }

    /// Declared attributes in declaration order.
    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    /// Nested columns carry a path separator in their name and are internal.
    pub fn is_nested(&self) -> bool {
        self.name.contains(PATH_SEPARATOR)
    }
}

/// Named table-like schema.
#[derive(Clone, Debug)]
pub struct Relation {
    name: String,
    columns: Vec<Column>,
    attributes: ValueMap,
}

impl Relation {
    /// Relation with no columns or attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            attributes: ValueMap::new(),
        }
    }

    /// Appends a column.
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds (or replaces) a relation-level attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Relation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Relation-level attributes.
    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }
}

/// Binds a result column to its header attributes and to the attributes
/// computed per row.
///
/// Header attributes are fixed for every row. Row-computed attributes are
/// looked up in each cell's metadata instead.
#[derive(Clone, Debug)]
pub struct ColumnMapping {
    column: Column,
    attributes: ValueMap,
    computed: IndexSet<String>,
}

impl ColumnMapping {
    /// Mapping whose header attributes are the column's declared attributes.
    pub fn new(column: Column) -> Self {
        let attributes = column.attributes().clone();
        Self {
            column,
            attributes,
            computed: IndexSet::new(),
        }
    }

    /// Marks `name` as computed per row.
    ///
    /// A row-computed attribute is no longer part of the fixed header.
    pub fn with_computed(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.attributes.shift_remove(&name);
        self.computed.insert(name);
        self
    }

    /// Underlying column.
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Fixed header attributes.
    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    /// True when at least one attribute is computed per row.
    pub fn has_computed_attributes(&self) -> bool {
        !self.computed.is_empty()
    }
}

/// Value of one column in one row, with the metadata computed for it.
#[derive(Clone, Debug, Default)]
pub struct ResultColumn {
    value: Value,
    metadata: ValueMap,
}

impl ResultColumn {
    /// Cell holding `value` with no metadata.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            metadata: ValueMap::new(),
        }
    }

    /// Adds (or replaces) a metadata entry.
    pub fn with_metadata(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    /// Cell value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Metadata computed for this cell.
    pub fn metadata(&self) -> &ValueMap {
        &self.metadata
    }
}
