//! Expression contract consumed from the translation subsystem, and the
//! renderer that turns expressions into encodable values.
//!
//! Translation into client dialects is best-effort. Every expression can be
//! translated into the native dialect, so rendering walks
//! [`Dialect::fallback_chain`] and keeps the first dialect that succeeds.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::warn;

use crate::dialect::Dialect;
use crate::error::{EncodeError, Result};
use crate::value::Value;

/// Marker wrapped around the source text of symbolic expressions.
pub const COMPUTED_PREFIX: &str = "$(";

/// How an expression is rendered into a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExprKind {
    /// Constant; evaluated to a concrete value.
    Literal,
    /// Deliberately unevaluated; rendered as its translated text as-is.
    Uncomputed,
    /// Depends on row data; rendered as `$(<translated text>)`.
    Symbolic,
}

/// Failure reported by an expression for one dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ExprError(pub String);

impl ExprError {
    /// Creates an error from a message.
    pub fn new(message: impl Into<String>) -> Self {
        ExprError(message.into())
    }
}

/// Context handed to literal evaluation.
///
/// It has no connection and no data source: only context-free reduction of
/// constants is possible through it.
#[derive(Debug, Default)]
pub struct LiteralContext {
    _private: (),
}

impl LiteralContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Expression as seen by the encoder.
pub trait Expression: fmt::Debug + Send + Sync {
    /// Rendering category of this expression.
    fn kind(&self) -> ExprKind;

    /// Source text of the expression in `dialect`.
    fn translate(&self, dialect: Dialect) -> std::result::Result<String, ExprError>;

    /// Concrete value of a literal in `dialect`.
    fn evaluate(
        &self,
        dialect: Dialect,
        _ctx: &LiteralContext,
    ) -> std::result::Result<Value, ExprError> {
        Err(ExprError(format!("expression is not a literal in {dialect}")))
    }
}

/// Constant expression wrapping a value.
#[derive(Clone, Debug)]
pub struct Literal(pub Value);

impl Expression for Literal {
    fn kind(&self) -> ExprKind {
        ExprKind::Literal
    }

    fn translate(&self, dialect: Dialect) -> std::result::Result<String, ExprError> {
        crate::encoder::value::to_json(&self.0, 0, dialect)
            .map_err(|err| ExprError(err.to_string()))
    }

    fn evaluate(
        &self,
        _dialect: Dialect,
        _ctx: &LiteralContext,
    ) -> std::result::Result<Value, ExprError> {
        Ok(self.0.clone())
    }
}

/// Expression carried as pre-translated source text.
///
/// The native text is always available; other dialects are available only
/// when a translation was supplied.
#[derive(Clone, Debug)]
pub struct SourceExpr {
    kind: ExprKind,
    native: String,
    translations: HashMap<Dialect, String>,
}

impl SourceExpr {
    /// Symbolic expression with the given native source text.
    pub fn symbolic(native: impl Into<String>) -> Self {
        Self::with_kind(ExprKind::Symbolic, native)
    }

    /// Uncomputed expression with the given native source text.
    pub fn uncomputed(native: impl Into<String>) -> Self {
        Self::with_kind(ExprKind::Uncomputed, native)
    }

    fn with_kind(kind: ExprKind, native: impl Into<String>) -> Self {
        Self {
            kind,
            native: native.into(),
            translations: HashMap::new(),
        }
    }

    /// Registers the text of this expression in `dialect`.
    pub fn with_translation(mut self, dialect: Dialect, text: impl Into<String>) -> Self {
        self.translations.insert(dialect, text.into());
        self
    }
}

impl Expression for SourceExpr {
    fn kind(&self) -> ExprKind {
        self.kind
    }

    fn translate(&self, dialect: Dialect) -> std::result::Result<String, ExprError> {
        if dialect == Dialect::Native {
            return Ok(self.native.clone());
        }
        self.translations
            .get(&dialect)
            .cloned()
            .ok_or_else(|| ExprError(format!("no {dialect} translation for `{}`", self.native)))
    }
}

/// Resolves expressions to values for a target dialect.
#[derive(Clone, Copy, Debug)]
pub struct ExpressionRenderer {
    target: Dialect,
}

impl ExpressionRenderer {
    /// Creates a renderer for `target`.
    pub fn new(target: Dialect) -> Self {
        Self { target }
    }

    /// Renders `expr` to a value.
    ///
    /// Literals evaluate to their value; uncomputed expressions become their
    /// translated text; symbolic expressions become `$(<translated text>)`.
    pub fn render(&self, expr: &dyn Expression) -> Result<Value> {
        match expr.kind() {
            ExprKind::Literal => {
                let ctx = LiteralContext::new();
                self.first_success(|dialect| expr.evaluate(dialect, &ctx))
                    .map_err(|(dialect, err)| EncodeError::Evaluation {
                        dialect,
                        message: err.0,
                    })
            }
            ExprKind::Uncomputed => self.translate(expr).map(Value::String),
            ExprKind::Symbolic => self
                .translate(expr)
                .map(|text| Value::String(format!("{COMPUTED_PREFIX}{text})"))),
        }
    }

    fn translate(&self, expr: &dyn Expression) -> Result<String> {
        self.first_success(|dialect| expr.translate(dialect))
            .map_err(|(dialect, err)| EncodeError::Translation {
                dialect,
                message: err.0,
            })
    }

    fn first_success<T>(
        &self,
        mut attempt: impl FnMut(Dialect) -> std::result::Result<T, ExprError>,
    ) -> std::result::Result<T, (Dialect, ExprError)> {
        let mut last = (self.target, ExprError::new("no dialect attempted"));
        for dialect in self.target.fallback_chain() {
            match attempt(dialect) {
                Ok(value) => return Ok(value),
                Err(err) => {
                    warn!(%dialect, error = %err, "expression rendering failed");
                    last = (dialect, err);
                }
            }
        }
        Err(last)
    }
}
