//! Session log output over `tracing`.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;

use switchyard_config::{LogConfig, LogFormat};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Errors raised while configuring session logging.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter expression could not be parsed.
    #[error("invalid log filter {filter:?}: {source}")]
    Filter {
        /// The expression as configured.
        filter: String,
        /// Parse failure reported by the filter layer.
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
}

/// Installs the global session subscriber, writing to stderr.
///
/// The first call installs the subscriber; later calls validate their
/// filter and otherwise leave the installed one alone, so sessions and
/// tests can call this freely. A subscriber installed by the embedding
/// process also wins; session logs then flow through it.
///
/// # Errors
/// Returns [`TelemetryError::Filter`] when the filter expression does not
/// parse.
pub fn initialise(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.filter).map_err(|source| TelemetryError::Filter {
        filter: config.filter.clone(),
        source,
    })?;
    INSTALLED.get_or_init(|| install(filter, config.format));
    Ok(())
}

fn install(filter: EnvFilter, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());
    let _ = match format {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
}
