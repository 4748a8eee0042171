use anyhow::Result;
use prometheus::Registry;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::metrics;

pub const METRICS_PREFIX: &str = "parts";
const DEFAULT_LOG_FILTER: &str = "parts_api=debug,tower_http=debug";

pub struct Observability {
    pub registry: Registry,
}

impl Observability {
    /// Install the global tracing subscriber and build the metrics registry
    ///
    /// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches
    /// to one JSON object per line.
    pub fn init() -> Result<Self> {
        let registry = new_registry(METRICS_PREFIX)?;

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

        let json_logs = std::env::var("LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        let (json_layer, text_layer) = if json_logs {
            (Some(fmt::layer().json()), None)
        } else {
            (None, Some(fmt::layer()))
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .with(text_layer)
            .init();

        tracing::info!(json_logs, "Observability stack initialized (Prometheus + tracing)");
        Ok(Self { registry })
    }
}

/// A prefixed registry with every application metric registered
pub fn new_registry(prefix: &str) -> Result<Registry> {
    let registry = Registry::new_custom(Some(prefix.into()), None)?;
    metrics::register_all(&registry)?;
    Ok(registry)
}
