use std::sync::OnceLock;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::core::config::Settings;

static PROM_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub(crate) fn init(settings: &Settings) -> anyhow::Result<()> {
    if !settings.telemetry().prometheus_enabled || PROM_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = PROM_HANDLE.set(handle);
    Ok(())
}

pub(crate) fn render() -> Option<String> {
    PROM_HANDLE.get().map(|handle| handle.render())
}

pub(crate) fn record_quiz_submission(route: &'static str, score: i32) {
    metrics::counter!("quiz_submissions_total", "route" => route).increment(1);
    metrics::histogram!("quiz_submission_score").record(f64::from(score));
}

pub(crate) fn record_tips_request(provider: &'static str, fallback: bool) {
    metrics::counter!(
        "study_tips_requests_total",
        "provider" => provider,
        "fallback" => if fallback { "true" } else { "false" }
    )
    .increment(1);
}
