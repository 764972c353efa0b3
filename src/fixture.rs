//! JSON documents describing a relation or a query result.
//!
//! Plain JSON values map onto [`Value`] directly. Kinds JSON cannot carry
//! use single-key tagged objects:
//!
//! ```text
//! {"$date": "2022-01-05"}
//! {"$time": "08:30:00.25"}
//! {"$datetime": "2022-01-05 08:30:00"}
//! {"$timestamp": "2022-01-05T08:30:00+04:00"}
//! {"$char": "x"}
//! {"$expr": "b + c", "kind": "symbolic", "translations": {"javascript": "b+c"}}
//! ```
//!
//! A result cell carrying metadata is written `{"$v": <value>, "$m": {...}}`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Map;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use tracing::debug;

use crate::cursor::MemoryCursor;
use crate::dialect::Dialect;
use crate::error::{EncodeError, Result};
use crate::expression::{Expression, Literal, SourceExpr};
use crate::model::{Column, ColumnMapping, Relation, ResultColumn};
use crate::value::{Value, ValueMap};

const DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME: &[FormatItem<'static>] =
    format_description!("[hour]:[minute]:[second][optional [.[subsecond]]]");
const DATETIME: &[FormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour]:[minute]:[second][optional [.[subsecond]]]"
);

/// Relation schema document.
#[derive(Debug, Deserialize)]
pub struct RelationDoc {
    /// Relation name.
    pub name: String,
    /// Relation-level attributes.
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnDoc>,
}

/// Column entry shared by both document kinds.
#[derive(Debug, Deserialize)]
pub struct ColumnDoc {
    /// Column name.
    pub name: String,
    /// Declared attributes.
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
    /// Expression of a derived column: source text or a tagged `$expr`.
    #[serde(default)]
    pub derived: Option<serde_json::Value>,
    /// Attribute names computed per row (result documents only).
    #[serde(default)]
    pub computed: Vec<String>,
}

/// Query result document.
#[derive(Debug, Deserialize)]
pub struct ResultDoc {
    /// Result-level attributes.
    #[serde(default)]
    pub attributes: Option<IndexMap<String, serde_json::Value>>,
    /// Primary table the result reads from.
    #[serde(default)]
    pub source_table: Option<String>,
    /// Result columns in output order.
    #[serde(default)]
    pub columns: Vec<ColumnDoc>,
    /// Rows of cells in column order.
    #[serde(default)]
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RelationDoc {
    /// Builds the relation this document describes.
    pub fn into_relation(self) -> Result<Relation> {
        let mut relation = Relation::new(self.name);
        for (name, value) in self.attributes {
            relation = relation.with_attribute(name, value_from_json(value)?);
        }
        for column in self.columns {
            relation = relation.with_column(column.into_column()?);
        }
        Ok(relation)
    }
}

impl ColumnDoc {
    fn into_column(self) -> Result<Column> {
        let mut column = match self.derived {
            Some(derived) => Column::derived_from(self.name, expression_from_json(derived)?),
            None => Column::new(self.name),
        };
        for (name, value) in self.attributes {
            column = column.with_attribute(name, value_from_json(value)?);
        }
        Ok(column)
    }
}

impl ResultDoc {
    /// Builds an in-memory cursor positioned before the first row.
    pub fn into_cursor(self) -> Result<MemoryCursor> {
        let width = self.columns.len();
        let mut columns = Vec::with_capacity(width);
        for doc in self.columns {
            let computed = doc.computed.clone();
            let mut mapping = ColumnMapping::new(doc.into_column()?);
            for name in computed {
                mapping = mapping.with_computed(name);
            }
            columns.push(mapping);
        }

        let mut cursor = MemoryCursor::new(columns);
        if let Some(attributes) = self.attributes {
            cursor = cursor.with_attributes(map_from_json(attributes)?);
        }
        if let Some(table) = self.source_table {
            cursor = cursor.with_source_table(table);
        }
        for (i, row) in self.rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(EncodeError::fixture(format!(
                    "row {i} has {} cells, expected {width}",
                    row.len()
                )));
            }
            let cells = row.into_iter().map(cell_from_json).collect::<Result<Vec<_>>>()?;
            cursor = cursor.with_row(cells);
        }
        Ok(cursor)
    }
}

/// Parses a relation document.
pub fn relation_from_str(text: &str) -> Result<Relation> {
    let doc: RelationDoc = serde_json::from_str(text)?;
    doc.into_relation()
}

/// Parses a result document.
pub fn result_from_str(text: &str) -> Result<MemoryCursor> {
    let doc: ResultDoc = serde_json::from_str(text)?;
    doc.into_cursor()
}

/// Reads a relation document from `path`.
pub fn load_relation(path: impl AsRef<Path>) -> Result<Relation> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading relation fixture");
    relation_from_str(&fs::read_to_string(path)?)
}

/// Reads a result document from `path`.
pub fn load_result(path: impl AsRef<Path>) -> Result<MemoryCursor> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading result fixture");
    result_from_str(&fs::read_to_string(path)?)
}

/// Converts a fixture JSON value, resolving tagged objects.
pub fn value_from_json(json: serde_json::Value) -> Result<Value> {
    Ok(match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(value_from_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        serde_json::Value::Object(obj) => match tagged(&obj)? {
            Some(value) => value,
            None => Value::Map(map_from_json(obj)?),
        },
    })
}

fn map_from_json(
    entries: impl IntoIterator<Item = (String, serde_json::Value)>,
) -> Result<ValueMap> {
    entries
        .into_iter()
        .map(|(key, value)| value_from_json(value).map(|value| (key, value)))
        .collect()
}

fn cell_from_json(json: serde_json::Value) -> Result<ResultColumn> {
    let mut obj = match json {
        serde_json::Value::Object(obj) => obj,
        other => return Ok(ResultColumn::new(value_from_json(other)?)),
    };
    let Some(value) = obj.remove("$v") else {
        return Ok(ResultColumn::new(value_from_json(serde_json::Value::Object(obj))?));
    };
    let mut cell = ResultColumn::new(value_from_json(value)?);
    match obj.remove("$m") {
        Some(serde_json::Value::Object(metadata)) => {
            for (name, value) in metadata {
                cell = cell.with_metadata(name, value_from_json(value)?);
            }
        }
        Some(other) => {
            return Err(EncodeError::fixture(format!(
                "cell metadata must be an object, got {other}"
            )));
        }
        None => {}
    }
    Ok(cell)
}

fn tagged(obj: &Map<String, serde_json::Value>) -> Result<Option<Value>> {
    if let Some(text) = obj.get("$date") {
        return Ok(Some(Value::Date(parse(text, "$date", |s| Date::parse(s, DATE))?)));
    }
    if let Some(text) = obj.get("$time") {
        return Ok(Some(Value::Time(parse(text, "$time", |s| Time::parse(s, TIME))?)));
    }
    if let Some(text) = obj.get("$datetime") {
        return Ok(Some(Value::DateTime(parse(text, "$datetime", |s| {
            PrimitiveDateTime::parse(s, DATETIME)
        })?)));
    }
    if let Some(text) = obj.get("$timestamp") {
        return Ok(Some(Value::Timestamp(parse(text, "$timestamp", |s| {
            OffsetDateTime::parse(s, &Rfc3339)
        })?)));
    }
    if let Some(text) = obj.get("$char") {
        let mut chars = text.as_str().unwrap_or_default().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Some(Value::Char(c))),
            _ => Err(EncodeError::fixture(format!("$char needs exactly one character, got {text}"))),
        };
    }
    if obj.contains_key("$expr") {
        return Ok(Some(Value::Expr(expression_from_json(serde_json::Value::Object(
            obj.clone(),
        ))?)));
    }
    Ok(None)
}

fn parse<T>(
    text: &serde_json::Value,
    tag: &str,
    parser: impl FnOnce(&str) -> std::result::Result<T, time::error::Parse>,
) -> Result<T> {
    let s = text
        .as_str()
        .ok_or_else(|| EncodeError::fixture(format!("{tag} must be a string, got {text}")))?;
    parser(s).map_err(|err| EncodeError::fixture(format!("bad {tag} `{s}`: {err}")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ExprKindDoc {
    Literal,
    Uncomputed,
    Symbolic,
}

#[derive(Debug, Deserialize)]
struct ExprDoc {
    #[serde(rename = "$expr")]
    source: serde_json::Value,
    #[serde(default = "default_kind")]
    kind: ExprKindDoc,
    #[serde(default)]
    translations: HashMap<String, String>,
}

fn default_kind() -> ExprKindDoc {
    ExprKindDoc::Symbolic
}

/// Bare strings are symbolic native source text; objects use the `$expr` tag.
fn expression_from_json(json: serde_json::Value) -> Result<Arc<dyn Expression>> {
    if let serde_json::Value::String(native) = json {
        return Ok(Arc::new(SourceExpr::symbolic(native)));
    }
    let doc: ExprDoc = serde_json::from_value(json)?;
    let native = match (&doc.kind, doc.source) {
        (ExprKindDoc::Literal, value) => return Ok(Arc::new(Literal(value_from_json(value)?))),
        (_, serde_json::Value::String(native)) => native,
        (_, other) => {
            return Err(EncodeError::fixture(format!(
                "$expr source must be a string, got {other}"
            )));
        }
    };
    let mut expr = match doc.kind {
        ExprKindDoc::Uncomputed => SourceExpr::uncomputed(native),
        _ => SourceExpr::symbolic(native),
    };
    for (name, text) in doc.translations {
        let dialect: Dialect = name
            .parse()
            .map_err(|err| EncodeError::fixture(format!("translation key: {err}")))?;
        expr = expr.with_translation(dialect, text);
    }
    Ok(Arc::new(expr))
}
