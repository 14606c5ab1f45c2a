use std::net::SocketAddr;

use crate::model::{BookOutcome, CancelOutcome, RegisterOutcome};

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: engine operations executed. Labels: op, outcome.
pub const OPERATIONS_TOTAL: &str = "datebooker_operations_total";

/// Histogram: operation latency in seconds. Labels: op.
pub const OPERATION_DURATION_SECONDS: &str = "datebooker_operation_duration_seconds";

/// Counter: rejected malformed requests. Labels: op.
pub const REQUEST_ERRORS_TOTAL: &str = "datebooker_request_errors_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: registered resources.
pub const RESOURCES_ACTIVE: &str = "datebooker_resources_active";

/// Gauge: held reservations across all resources.
pub const RESERVATIONS_HELD: &str = "datebooker_reservations_held";

/// Counter: store-level capacity violations. Nonzero means an engine bug.
pub const INVARIANT_VIOLATIONS_TOTAL: &str = "datebooker_invariant_violations_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(port) = port else { return Ok(()) };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
    Ok(())
}

pub fn register_label(outcome: &RegisterOutcome) -> &'static str {
    match outcome {
        RegisterOutcome::Registered { .. } => "registered",
        RegisterOutcome::InvalidCapacity { .. } => "invalid_capacity",
    }
}

pub fn book_label(outcome: &BookOutcome) -> &'static str {
    match outcome {
        BookOutcome::BookSuccess { .. } => "success",
        BookOutcome::NoMoreSpace => "no_more_space",
        BookOutcome::BookConflict { .. } => "conflict",
        BookOutcome::UnknownResource => "unknown_resource",
    }
}

pub fn cancel_label(outcome: &CancelOutcome) -> &'static str {
    match outcome {
        CancelOutcome::Cancellation { .. } => "cancelled",
        CancelOutcome::PermissionDenied => "permission_denied",
        CancelOutcome::UnknownBooking => "unknown_booking",
    }
}
