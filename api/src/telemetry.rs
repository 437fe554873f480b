//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when set; otherwise `log.level` from the settings is used
//! as the filter directive. Records emitted through the `log` crate are
//! forwarded into the same subscriber.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

use bd_shared::{LogFormat, LoggingConfig};

/// Filter used when neither `RUST_LOG` nor `log.level` parse
const FALLBACK_FILTER: &str = "info";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    }
    .map_err(|err| anyhow!(err))
}

/// Build a filter from a configured level, falling back to `info`
pub fn level_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|err| {
        eprintln!("Invalid log level {:?} ({}), using {}", level, err, FALLBACK_FILTER);
        EnvFilter::new(FALLBACK_FILTER)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_accepts_directives() {
        assert_eq!(level_filter("debug").to_string(), "debug");
        let filter = level_filter("info,bd_infra=trace").to_string();
        assert!(filter.contains("bd_infra=trace"));
        assert!(filter.contains("info"));
    }

    #[test]
    fn test_level_filter_falls_back_on_garbage() {
        assert_eq!(level_filter("bd_infra=loud").to_string(), FALLBACK_FILTER);
    }
}
