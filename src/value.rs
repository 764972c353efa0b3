//! Closed set of value kinds the encoder knows how to render.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

use crate::expression::Expression;

/// Ordered name to value mapping; iteration order is declaration order.
pub type ValueMap = IndexMap<String, Value>;

/// Value produced by the execution engine or attached to schema metadata.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null literal.
    Null,
    /// UTF-8 string.
    String(String),
    /// Single character.
    Char(char),
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Already JSON-shaped value, emitted verbatim.
    Json(serde_json::Value),
    /// Keyed mapping rendered as a JSON object in insertion order.
    Map(ValueMap),
    /// Variable-length sequence; elements are separated by line breaks.
    List(Vec<Value>),
    /// Fixed-size array; elements are rendered on one line.
    Array(Vec<Value>),
    /// Calendar date.
    Date(Date),
    /// Time of day.
    Time(Time),
    /// Date and time without a zone.
    DateTime(PrimitiveDateTime),
    /// Legacy timestamp; its offset is dropped when rendered.
    Timestamp(OffsetDateTime),
    /// Structured object with its own textual form.
    Text(Arc<dyn StringForm>),
    /// Computed expression, rendered through a dialect.
    Expr(Arc<dyn Expression>),
    /// Anything else; rendered as its quoted display text.
    Other(Arc<dyn Opaque>),
}

/// Structured value that flattens itself to text.
pub trait StringForm: fmt::Debug + Send + Sync {
    /// Appends the textual form of `self` to `out`.
    fn write_form(&self, out: &mut String, indent: usize);
}

/// Value kinds the encoder has no dedicated rendering for.
pub trait Opaque: fmt::Display + fmt::Debug + Send + Sync {}

impl<T: fmt::Display + fmt::Debug + Send + Sync> Opaque for T {}

impl Value {
    /// Wraps an expression.
    pub fn expr(expression: impl Expression + 'static) -> Self {
        Value::Expr(Arc::new(expression))
    }

    /// Wraps a value without a dedicated rendering.
    pub fn other(value: impl Opaque + 'static) -> Self {
        Value::Other(Arc::new(value))
    }

    /// Builds a mapping from `(name, value)` pairs, preserving their order.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::Char(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Value::Time(value)
    }
}

impl From<PrimitiveDateTime> for Value {
    fn from(value: PrimitiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::Timestamp(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Value::Json(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}
