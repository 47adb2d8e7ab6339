use tracing_subscriber::EnvFilter;

use crate::engine::types::Grid;

pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[cfg(feature = "metrics-exporter")]
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()?;

    tracing::info!(port, "Prometheus exporter listening on /metrics");
    metrics::gauge!("pricegrid_up").set(1.0);
    Ok(())
}

#[cfg(not(feature = "metrics-exporter"))]
pub fn init_metrics(_port: u16) -> anyhow::Result<()> {
    Ok(())
}

pub fn record_op(op: &'static str, accepted: bool) {
    let outcome = if accepted { "ok" } else { "rejected" };
    metrics::counter!("pricegrid_ops_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_dimensions(grid: &Grid) {
    metrics::gauge!("pricegrid_heights").set(grid.heights.len() as f64);
    metrics::gauge!("pricegrid_widths").set(grid.widths.len() as f64);
}
