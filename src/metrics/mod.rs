// metrics/mod.rs
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Serves Prometheus metrics on `0.0.0.0:port`. Must be called from within
/// the tokio runtime.
pub fn setup_metrics(port: u16) -> Result<(), BuildError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    Ok(())
}

fn describe() {
    describe_counter!("smarthome_rpc_requests_total", "RPC calls received, by method");
    describe_counter!("smarthome_rpc_errors_total", "Protocol-level RPC failures, by method and code");
    describe_counter!("smarthome_telemetry_ticks_total", "Simulation ticks applied, by device type");
    describe_gauge!("smarthome_monitor_streams_active", "Monitor streams currently open");
}
