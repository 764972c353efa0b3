//! Query result envelope: `$m`, `columns`, and `rows` sections.
//!
//! Each section is optional. A separator is written before a section only
//! when an earlier section produced output, and the rows array is opened
//! lazily on the first row the cursor yields.

use std::io::Write;

use tracing::{debug, trace};

use crate::config::EncoderConfig;
use crate::cursor::ResultCursor;
use crate::encoder::metadata::overrides;
use crate::encoder::value::{push_indent, push_quoted, ValueEncoder};
use crate::error::{EncodeError, Result};
use crate::model::{ColumnMapping, ResultColumn, ID_ATTRIBUTE, TYPE_ATTRIBUTE};
use crate::value::Value;

pub(crate) struct ResultEnvelopeEncoder<'a> {
    out: &'a mut dyn Write,
    config: &'a EncoderConfig,
    values: ValueEncoder,
    has_previous: bool,
}

impl<'a> ResultEnvelopeEncoder<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, config: &'a EncoderConfig) -> Self {
        Self {
            out,
            config,
            values: ValueEncoder::new(config.target),
            has_previous: false,
        }
    }

    /// Writes the whole document and returns the number of rows written.
    pub(crate) fn encode(mut self, cursor: &mut dyn ResultCursor) -> Result<usize> {
        let rows_only = self.config.rows_only;
        if !rows_only {
            self.emit("{\n")?;
        }
        if self.config.emits_structure() {
            self.write_metadata(cursor)?;
            self.write_columns(cursor.columns())?;
        }
        let rows = if self.config.emits_rows() {
            self.write_rows(cursor)?
        } else {
            0
        };
        if !rows_only {
            self.emit("}")?;
        }
        self.out.flush()?;
        debug!(
            columns = cursor.column_count(),
            rows,
            rows_only,
            structure_only = self.config.structure_only,
            "encoded result"
        );
        Ok(rows)
    }

    fn write_metadata(&mut self, cursor: &dyn ResultCursor) -> Result<()> {
        let mut attributes = cursor.result_attributes().cloned().unwrap_or_default();
        if !attributes.contains_key(TYPE_ATTRIBUTE) {
            if let Some(table) = cursor.source_table() {
                attributes.insert(TYPE_ATTRIBUTE.to_string(), Value::from(table));
            }
        }
        if attributes.is_empty() {
            return Ok(());
        }

        let indent = self.config.indent;
        let mut text = String::from("\"$m\":{\n");
        for (i, (name, value)) in attributes.iter().enumerate() {
            if i > 0 {
                text.push_str(",\n");
            }
            push_indent(&mut text, indent);
            push_quoted(&mut text, name)?;
            text.push(':');
            self.values.write(&mut text, value, indent)?;
        }
        text.push_str("\n}");
        self.emit(&text)?;
        self.has_previous = true;
        Ok(())
    }

    fn write_columns(&mut self, columns: &[ColumnMapping]) -> Result<()> {
        if columns.is_empty() {
            return Ok(());
        }

        let indent = self.config.indent;
        let mut text = String::new();
        if self.has_previous {
            text.push_str(",\n");
        }
        text.push_str("\"columns\":{");
        for (i, mapping) in columns.iter().enumerate() {
            text.push_str(if i == 0 { "\n" } else { ",\n" });
            push_indent(&mut text, indent);
            push_quoted(&mut text, mapping.column().name())?;
            text.push_str(":{");
            let visible = mapping
                .attributes()
                .iter()
                .filter(|(name, _)| name.as_str() != ID_ATTRIBUTE);
            let mut entries = 0;
            for (name, value) in visible {
                text.push_str(if entries == 0 { "\n" } else { ",\n" });
                push_indent(&mut text, indent * 2);
                push_quoted(&mut text, name)?;
                text.push(':');
                self.values.write(&mut text, value, indent)?;
                entries += 1;
            }
            if entries > 0 {
                text.push('\n');
                push_indent(&mut text, indent);
            }
            text.push('}');
        }
        text.push_str("\n}");
        self.emit(&text)?;
        self.has_previous = true;
        Ok(())
    }

    fn write_rows(&mut self, cursor: &mut dyn ResultCursor) -> Result<usize> {
        let rows_only = self.config.rows_only;
        let indent = self.config.indent;
        let column_count = cursor.column_count();
        let mut rows = 0;
        while cursor.advance()? {
            let mut text = String::new();
            if rows == 0 {
                if self.has_previous {
                    text.push_str(",\n");
                }
                if !rows_only {
                    text.push_str("\"rows\":");
                }
                text.push_str("[\n");
            } else {
                text.push_str(",\n");
            }
            push_indent(&mut text, indent);
            text.push('[');
            for column in 0..column_count {
                if column > 0 {
                    text.push_str(", ");
                }
                let mapping = cursor.columns().get(column);
                let (mapping, cell) = mapping
                    .zip(cursor.cell(column))
                    .ok_or(EncodeError::MissingCell { row: rows, column })?;
                self.write_cell(&mut text, mapping, cell)?;
            }
            text.push(']');
            self.emit(&text)?;
            trace!(row = rows, "encoded row");
            rows += 1;
        }
        if rows > 0 {
            self.emit("\n]\n")?;
        } else if rows_only {
            self.emit("[]")?;
        }
        Ok(rows)
    }

    fn write_cell(
        &self,
        out: &mut String,
        mapping: &ColumnMapping,
        cell: &ResultColumn,
    ) -> Result<()> {
        let indent = self.config.indent;
        let metadata = overrides(mapping, cell);
        if metadata.is_empty() {
            return self.values.write(out, cell.value(), indent);
        }
        out.push_str("{\"$v\":");
        self.values.write(out, cell.value(), indent)?;
        out.push_str(", \"$m\":{");
        for (i, (name, value)) in metadata.into_iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            push_quoted(out, name)?;
            out.push(':');
            self.values.write(out, value, indent)?;
        }
        out.push_str("}}");
        Ok(())
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        self.out.write_all(text.as_bytes())?;
        Ok(())
    }
}
