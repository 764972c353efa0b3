//! Target languages expressions can be translated into.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Rendering dialect for expressions embedded in encoded documents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Dialect {
    /// The engine's own query language; every expression translates to it.
    Native,
    /// Client-side scripting form consumed by UI code.
    JavaScript,
    /// PostgreSQL SQL.
    Postgresql,
    /// Microsoft SQL Server T-SQL.
    SqlServer,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect::JavaScript
    }
}

impl Dialect {
    /// Dialects to try, in order, when rendering for `self`.
    ///
    /// The requested dialect comes first and the native dialect last; the
    /// native dialect appears only once when it was the one requested.
    pub fn fallback_chain(self) -> Vec<Dialect> {
        if self == Dialect::Native {
            vec![Dialect::Native]
        } else {
            vec![self, Dialect::Native]
        }
    }

    /// Canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Native => "native",
            Dialect::JavaScript => "javascript",
            Dialect::Postgresql => "postgresql",
            Dialect::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}'")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "esql" => Ok(Dialect::Native),
            "javascript" | "js" => Ok(Dialect::JavaScript),
            "postgresql" | "postgres" | "pg" => Ok(Dialect::Postgresql),
            "sqlserver" | "mssql" => Ok(Dialect::SqlServer),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

impl TryFrom<String> for Dialect {
    type Error = UnknownDialect;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}
