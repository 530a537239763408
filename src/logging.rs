//! Tracing subscriber setup for the CLI.
//!
//! Events go to stderr so stdout carries only the selected logins.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogFormat, LoggingSection};

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(logging: &LoggingSection, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        logging.level.clone()
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over config.
pub fn init_tracing(logging: &LoggingSection, verbose: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(logging, verbose)))?;

    let registry = tracing_subscriber::registry().with(filter);
    match logging.log_format().unwrap_or_default() {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    Ok(())
}
