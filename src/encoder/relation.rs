//! Relation structure document: relation attributes and per-column attributes.

use std::io::Write;

use tracing::debug;

use crate::config::EncoderConfig;
use crate::encoder::value::{push_indent, push_quoted, ValueEncoder};
use crate::error::Result;
use crate::model::{Column, Relation, ID_ATTRIBUTE, TYPE_ATTRIBUTE};
use crate::value::Value;

const DERIVED_EXPRESSION: &str = "derived_expression";

pub(crate) struct RelationStructureEncoder<'a> {
    out: &'a mut dyn Write,
    indent: usize,
    values: ValueEncoder,
}

impl<'a> RelationStructureEncoder<'a> {
    pub(crate) fn new(out: &'a mut dyn Write, config: &EncoderConfig) -> Self {
        Self {
            out,
            indent: config.indent,
            values: ValueEncoder::new(config.target),
        }
    }

    pub(crate) fn encode(self, relation: &Relation) -> Result<()> {
        let mut text = String::from("{\n");
        self.write_metadata(&mut text, relation)?;

        let visible: Vec<&Column> = relation
            .columns()
            .iter()
            .filter(|column| !column.is_nested())
            .collect();
        if !relation.columns().is_empty() {
            text.push_str(",\n\"columns\":{");
            for (i, column) in visible.iter().enumerate() {
                text.push_str(if i == 0 { "\n" } else { ",\n" });
                self.write_column(&mut text, column)?;
            }
            text.push_str("\n}");
        }
        text.push('}');

        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        debug!(
            relation = relation.name(),
            columns = visible.len(),
            hidden = relation.columns().len() - visible.len(),
            "encoded relation structure"
        );
        Ok(())
    }

    fn write_metadata(&self, text: &mut String, relation: &Relation) -> Result<()> {
        let mut attributes = relation.attributes().clone();
        if !attributes.contains_key(TYPE_ATTRIBUTE) {
            attributes.insert(TYPE_ATTRIBUTE.to_string(), Value::from(relation.name()));
        }

        text.push_str("\"$m\":{\n");
        for (i, (name, value)) in attributes.iter().enumerate() {
            if i > 0 {
                text.push_str(",\n");
            }
            push_indent(text, self.indent);
            push_quoted(text, name)?;
            text.push(':');
            self.values.write(text, value, self.indent)?;
        }
        text.push_str("\n}");
        Ok(())
    }

    fn write_column(&self, text: &mut String, column: &Column) -> Result<()> {
        let indent = self.indent;
        push_indent(text, indent);
        push_quoted(text, column.name())?;
        text.push_str(":{");

        let mut entries = 0;
        if let Some(expr) = column.expression() {
            text.push('\n');
            push_indent(text, indent * 2);
            push_quoted(text, DERIVED_EXPRESSION)?;
            text.push_str(": ");
            self.values.write_expression(text, expr, 0)?;
            entries += 1;
        }

        let attributes = column
            .attributes()
            .iter()
            .filter(|(name, _)| name.as_str() != ID_ATTRIBUTE);
        for (name, value) in attributes {
            text.push_str(if entries == 0 { "\n" } else { ",\n" });
            push_indent(text, indent * 2);
            push_quoted(text, name)?;
            text.push(':');
            self.values.write(text, value, indent)?;
            entries += 1;
        }

        if entries > 0 {
            text.push('\n');
            push_indent(text, indent);
        }
        text.push('}');
        Ok(())
    }
}
