//! Rendering of single values as JSON text.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, Time};

use crate::dialect::Dialect;
use crate::error::Result;
use crate::expression::{Expression, ExpressionRenderer};
use crate::value::{Value, ValueMap};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const CLOCK_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Renders [`Value`]s as JSON text, resolving expressions in a target dialect.
#[derive(Clone, Copy, Debug)]
pub struct ValueEncoder {
    renderer: ExpressionRenderer,
}

/// Renders `value` at `indent` with expressions translated into `dialect`.
pub fn to_json(value: &Value, indent: usize, dialect: Dialect) -> Result<String> {
    ValueEncoder::new(dialect).encode(value, indent)
}

impl ValueEncoder {
    /// Encoder rendering expressions in `dialect`.
    pub fn new(dialect: Dialect) -> Self {
        Self {
            renderer: ExpressionRenderer::new(dialect),
        }
    }

    /// Renders `value` with nested objects indented by `indent` spaces.
    pub fn encode(&self, value: &Value, indent: usize) -> Result<String> {
        let mut out = String::new();
        self.write(&mut out, value, indent)?;
        Ok(out)
    }

    /// Appends the rendering of `value` to `out`.
    pub fn write(&self, out: &mut String, value: &Value, indent: usize) -> Result<()> {
        match value {
            Value::Expr(expr) => self.write_expression(out, expr.as_ref(), indent)?,
            Value::Null => out.push_str("null"),
            Value::String(text) => push_quoted(out, text)?,
            Value::Char(c) => push_quoted(out, c.encode_utf8(&mut [0; 4]))?,
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Float(n) => match serde_json::Number::from_f64(*n) {
                Some(number) => out.push_str(&number.to_string()),
                None => out.push_str("null"),
            },
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Json(json) => write_json(out, json, indent)?,
            Value::Map(map) => self.write_map(out, map, indent)?,
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(",\n");
                    }
                    self.write(out, item, indent + 1)?;
                }
                out.push(']');
            }
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    self.write(out, item, indent)?;
                }
                out.push(']');
            }
            Value::Date(date) => push_quoted(out, &date.format(DATE_FORMAT)?)?,
            Value::Time(time) => push_quoted(out, &format_time(*time)?)?,
            Value::DateTime(dt) => {
                let date = dt.date().format(DATE_FORMAT)?;
                push_quoted(out, &format!("{date} {}", format_time(dt.time())?))?;
            }
            Value::Timestamp(ts) => push_quoted(out, &format_timestamp(*ts)?)?,
            Value::Text(form) => {
                let mut text = String::new();
                form.write_form(&mut text, indent);
                push_quoted(out, &text)?;
            }
            Value::Other(other) => push_quoted(out, &other.to_string())?,
        }
        Ok(())
    }

    /// Appends the rendering of an expression resolved in the target dialect.
    pub fn write_expression(
        &self,
        out: &mut String,
        expr: &dyn Expression,
        indent: usize,
    ) -> Result<()> {
        let rendered = self.renderer.render(expr)?;
        self.write(out, &rendered, indent)
    }

    fn write_map(&self, out: &mut String, map: &ValueMap, indent: usize) -> Result<()> {
        out.push('{');
        for (i, (key, value)) in map.iter().enumerate() {
            if i == 0 {
                if indent > 0 {
                    out.push('\n');
                }
            } else {
                out.push_str(",\n");
            }
            push_indent(out, indent);
            push_quoted(out, key)?;
            out.push(':');
            self.write(out, value, indent + 1)?;
        }
        out.push('}');
        Ok(())
    }
}

/// Appends `text` as a JSON string literal.
pub(crate) fn push_quoted(out: &mut String, text: &str) -> Result<()> {
    out.push_str(&serde_json::to_string(text)?);
    Ok(())
}

pub(crate) fn push_indent(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn write_json(out: &mut String, json: &serde_json::Value, indent: usize) -> Result<()> {
    match json {
        serde_json::Value::Object(_) if indent > 0 => {
            let spaces = " ".repeat(indent);
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(
                &mut buf,
                PrettyFormatter::with_indent(spaces.as_bytes()),
            );
            json.serialize(&mut ser)?;
            out.push_str(&String::from_utf8_lossy(&buf));
        }
        other => out.push_str(&serde_json::to_string(other)?),
    }
    Ok(())
}

/// `HH:MM:SS`, followed by the fraction of a second when it is not zero.
fn format_time(time: Time) -> Result<String> {
    let mut text = time.format(CLOCK_FORMAT)?;
    let nanos = time.nanosecond();
    if nanos != 0 {
        let fraction = format!("{nanos:09}");
        text.push('.');
        text.push_str(fraction.trim_end_matches('0'));
    }
    Ok(text)
}

/// Date and time with an unpadded millisecond fraction; the offset is dropped.
fn format_timestamp(ts: OffsetDateTime) -> Result<String> {
    Ok(format!("{}.{}", ts.format(TIMESTAMP_FORMAT)?, ts.millisecond()))
}
