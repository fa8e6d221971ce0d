//! Telemetry configuration consumed by the runner's subscriber setup.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Output format for the tracing subscriber.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-oriented single-line output.
    #[default]
    Compact,
    /// Machine-oriented JSON lines.
    Json,
}

/// Telemetry settings for one orchestration session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` expression selecting log verbosity.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_filter() -> String {
    "info".to_owned()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests use expect for clarity")]

    use std::str::FromStr;

    use super::*;

    #[test]
    fn format_parses_from_lowercase_names() {
        assert_eq!(LogFormat::from_str("json").expect("parse"), LogFormat::Json);
        assert_eq!(
            LogFormat::from_str("compact").expect("parse"),
            LogFormat::Compact
        );
    }

    #[test]
    fn default_config_filters_at_info() {
        let config = LogConfig::default();
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Compact);
    }
}
