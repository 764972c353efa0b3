//! Document encoders.
//!
//! [`JsonResultEncoder`] writes two document forms: the result envelope
//! (`$m`, `columns`, `rows`) for a [`ResultCursor`], and the structure
//! document (`$m`, `columns`) for a [`Relation`]. Both stream to any
//! [`Write`] sink and delegate single values to [`value::ValueEncoder`].

pub mod metadata;
mod relation;
mod result;
pub mod value;

use std::io::{self, Write};

use crate::config::EncoderConfig;
use crate::cursor::ResultCursor;
use crate::error::Result;
use crate::model::Relation;

use self::relation::RelationStructureEncoder;
use self::result::ResultEnvelopeEncoder;

/// Serializes query results and relation schemas.
pub trait ResultEncoder {
    /// Writes the result envelope for `cursor`, consuming its rows.
    fn encode_result(
        &self,
        cursor: &mut dyn ResultCursor,
        out: &mut dyn Write,
        config: &EncoderConfig,
    ) -> Result<()>;

    /// Writes the structure document for `relation`.
    fn encode_relation(
        &self,
        relation: &Relation,
        out: &mut dyn Write,
        config: &EncoderConfig,
    ) -> Result<()>;

    /// Result envelope as a string.
    fn encode_result_to_string(
        &self,
        cursor: &mut dyn ResultCursor,
        config: &EncoderConfig,
    ) -> Result<String> {
        let mut out = Vec::new();
        self.encode_result(cursor, &mut out, config)?;
        into_string(out)
    }

    /// Structure document as a string.
    fn encode_relation_to_string(
        &self,
        relation: &Relation,
        config: &EncoderConfig,
    ) -> Result<String> {
        let mut out = Vec::new();
        self.encode_relation(relation, &mut out, config)?;
        into_string(out)
    }
}

/// JSON implementation of [`ResultEncoder`].
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonResultEncoder;

impl JsonResultEncoder {
    /// Creates an encoder.
    pub fn new() -> Self {
        Self
    }
}

impl ResultEncoder for JsonResultEncoder {
    fn encode_result(
        &self,
        cursor: &mut dyn ResultCursor,
        out: &mut dyn Write,
        config: &EncoderConfig,
    ) -> Result<()> {
        ResultEnvelopeEncoder::new(out, config).encode(cursor)?;
        Ok(())
    }

    fn encode_relation(
        &self,
        relation: &Relation,
        out: &mut dyn Write,
        config: &EncoderConfig,
    ) -> Result<()> {
        RelationStructureEncoder::new(out, config).encode(relation)
    }
}

fn into_string(bytes: Vec<u8>) -> Result<String> {
    String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err).into())
}
