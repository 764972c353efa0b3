//! Installation of the global `tracing` subscriber for binaries.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ConfigError;
use crate::error::Result;

/// Installs a formatting subscriber filtered by `level` (an `EnvFilter` directive).
///
/// Output goes to stderr so documents written to stdout stay intact.
pub fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| ConfigError::Logging(format!("invalid log level: {e}")))?;
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|_| ConfigError::Logging("logging already initialized".into()).into())
}
