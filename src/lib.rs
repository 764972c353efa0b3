//! Streaming JSON encoding of query results and relation schemas.
//!
//! A [`ResultCursor`] is written as a result envelope:
//!
//! ```text
//! {"$m": {...}, "columns": {...}, "rows": [[...], ...]}
//! ```
//!
//! and a [`Relation`] as a structure document holding its attributes and
//! per-column attributes. Expressions embedded in values are rendered in the
//! configured [`Dialect`], falling back to the native dialect.
//!
//! ```
//! use rowjson::{Column, ColumnMapping, EncoderConfig, JsonResultEncoder, MemoryCursor,
//!     ResultColumn, ResultEncoder};
//!
//! let mut cursor = MemoryCursor::new(vec![ColumnMapping::new(Column::new("a"))])
//!     .with_row(vec![ResultColumn::new(1)]);
//! let config = EncoderConfig::default().with_rows_only(true);
//! let text = JsonResultEncoder::new().encode_result_to_string(&mut cursor, &config)?;
//! assert_eq!(text, "[\n  [1]\n]\n");
//! # Ok::<(), rowjson::EncodeError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod cursor;
pub mod dialect;
pub mod encoder;
pub mod error;
pub mod expression;
pub mod fixture;
pub mod logging;
pub mod model;
pub mod value;

pub use config::{ConfigError, EncoderConfig};
pub use cursor::{MemoryCursor, ResultCursor};
pub use dialect::Dialect;
pub use encoder::{JsonResultEncoder, ResultEncoder};
pub use error::{EncodeError, Result};
pub use expression::{ExprError, ExprKind, Expression, ExpressionRenderer, Literal, SourceExpr};
pub use model::{Column, ColumnMapping, Relation, ResultColumn};
pub use value::{Value, ValueMap};
