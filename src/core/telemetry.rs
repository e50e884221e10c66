use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::Settings;

/// Installs the global subscriber. `RUST_LOG` wins over `STUDYHALL_LOG_LEVEL`.
pub(crate) fn init_tracing(settings: &Settings) -> anyhow::Result<()> {
    let filter = build_filter(&settings.telemetry().log_level);
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(fmt::format::FmtSpan::CLOSE);

    if settings.telemetry().json {
        builder.json().try_init().map_err(|err| anyhow::anyhow!(err.to_string()))?;
    } else {
        builder.try_init().map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }

    Ok(())
}

fn build_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
