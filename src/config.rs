//! Encoder options and the ways they are supplied.
//!
//! Options come from key/value parameters (`INDENT`, `TARGET`,
//! `STRUCTURE_ONLY`, `ROWS_ONLY`) or from a TOML file with the same keys in
//! lowercase. Flags are independent and never checked against each other.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialect::Dialect;

/// Spaces per nesting level.
pub const INDENT: &str = "INDENT";
/// Dialect expressions are rendered in.
pub const TARGET: &str = "TARGET";
/// Emit metadata and column headers only.
pub const STRUCTURE_ONLY: &str = "STRUCTURE_ONLY";
/// Emit the bare rows array only.
pub const ROWS_ONLY: &str = "ROWS_ONLY";

const DEFAULT_INDENT: usize = 2;

/// Options controlling document layout and expression rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Spaces per nesting level.
    pub indent: usize,
    /// Dialect expressions are rendered in first.
    pub target: Dialect,
    /// Suppress the rows section.
    pub structure_only: bool,
    /// Suppress metadata and column headers; emit rows as a bare array.
    pub rows_only: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
            target: Dialect::default(),
            structure_only: false,
            rows_only: false,
        }
    }
}

impl EncoderConfig {
    /// Builds a configuration from named parameters.
    ///
    /// Names match case-insensitively; unknown names are ignored.
    pub fn from_params<K, I>(params: I) -> Result<Self, ConfigError>
    where
        K: AsRef<str>,
        I: IntoIterator<Item = (K, serde_json::Value)>,
    {
        let mut config = Self::default();
        for (key, value) in params {
            let key = key.as_ref();
            if key.eq_ignore_ascii_case(INDENT) {
                config.indent = value
                    .as_u64()
                    .and_then(|v| usize::try_from(v).ok())
                    .ok_or_else(|| ConfigError::invalid(INDENT, &value, "a non-negative integer"))?;
            } else if key.eq_ignore_ascii_case(TARGET) {
                config.target = value
                    .as_str()
                    .and_then(|name| name.parse().ok())
                    .ok_or_else(|| ConfigError::invalid(TARGET, &value, "a dialect name"))?;
            } else if key.eq_ignore_ascii_case(STRUCTURE_ONLY) {
                config.structure_only = value
                    .as_bool()
                    .ok_or_else(|| ConfigError::invalid(STRUCTURE_ONLY, &value, "a boolean"))?;
            } else if key.eq_ignore_ascii_case(ROWS_ONLY) {
                config.rows_only = value
                    .as_bool()
                    .ok_or_else(|| ConfigError::invalid(ROWS_ONLY, &value, "a boolean"))?;
            }
        }
        Ok(config)
    }

    /// Reads a configuration from a TOML file; absent keys keep their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `explicit`, else the default file when it exists, else defaults.
    pub fn load_or_default(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load(path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Sets the indent width.
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the target dialect.
    pub fn with_target(mut self, target: Dialect) -> Self {
        self.target = target;
        self
    }

    /// Sets the rows-only flag.
    pub fn with_rows_only(mut self, rows_only: bool) -> Self {
        self.rows_only = rows_only;
        self
    }

    /// Sets the structure-only flag.
    pub fn with_structure_only(mut self, structure_only: bool) -> Self {
        self.structure_only = structure_only;
        self
    }

    pub(crate) fn emits_structure(&self) -> bool {
        !self.rows_only
    }

    pub(crate) fn emits_rows(&self) -> bool {
        !self.structure_only
    }
}

/// Location of the per-user encoder configuration file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("rowjson").join("encoder.toml"))
}

/// Errors raised while building an [`EncoderConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read.
    #[error("failed to read encoder config {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// File is not valid TOML for the expected keys.
    #[error("failed to parse encoder config {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// Recognized option carried a value of the wrong kind.
    #[error("option {key} must be {expected} (got {value})")]
    InvalidValue {
        /// Option name.
        key: &'static str,
        /// Offending value as JSON text.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// Logging subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl ConfigError {
    fn invalid(key: &'static str, value: &serde_json::Value, expected: &'static str) -> Self {
        ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected,
        }
    }
}
