//! Tracing subscriber initialization.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "drivegate=debug,drivegate_api=debug,tower_http=debug,axum=info";

/// Initialize the tracing subscriber. `RUST_LOG` overrides the default filter;
/// production gets JSON lines, everything else a compact human format.
pub fn init_telemetry(is_production: bool) -> Result<(), anyhow::Error> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init()?;
    }

    Ok(())
}
