//! Tracing subscriber setup
//!
//! Logs go to stderr so stdout stays reserved for command output and event lines.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use apkscope_core::config::GeneralConfig;

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `general.log_level`.
/// `general.log_format` selects `json` or `pretty` output.
pub fn init_tracing(config: &GeneralConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_thread_ids(true),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
        }
    }

    Ok(())
}
