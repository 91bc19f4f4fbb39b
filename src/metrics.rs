//! Prometheus metrics for authentication observability.
//!
//! # Available Metrics
//!
//! ## Counters
//! - `oauth_authentications_total` - Authentication attempts (label: outcome)
//! - `oauth_validation_failures_total` - Failed token lookups (label: reason)
//!
//! ## Histograms
//! - `oauth_validation_duration_seconds` - Round trip to the introspection service
//!
//! Recording functions are no-ops until [`init_metrics`] installs the exporter,
//! so library users that never call it pay nothing.

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info};

use crate::oauth::TokenLookup;

/// Metric names as constants for consistency.
pub mod names {
    pub const AUTHENTICATIONS_TOTAL: &str = "oauth_authentications_total";
    pub const VALIDATION_FAILURES_TOTAL: &str = "oauth_validation_failures_total";
    pub const VALIDATION_DURATION_SECONDS: &str = "oauth_validation_duration_seconds";
}

pub const OUTCOME_AUTHENTICATED: &str = "authenticated";
pub const OUTCOME_ANONYMOUS: &str = "anonymous";
pub const OUTCOME_FAILED: &str = "failed";

/// Initialize the Prometheus metrics exporter.
///
/// # Errors
///
/// Returns a message if the exporter cannot be installed (e.g. port in use).
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::AUTHENTICATIONS_TOTAL,
        "Total number of authentication attempts by outcome"
    );
    describe_counter!(
        names::VALIDATION_FAILURES_TOTAL,
        "Total number of failed token lookups by reason"
    );
    describe_histogram!(
        names::VALIDATION_DURATION_SECONDS,
        "Token introspection round trip in seconds"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Try to initialize metrics, logging any errors but not failing.
pub fn try_init_metrics(metrics_addr: SocketAddr) {
    if let Err(e) = init_metrics(metrics_addr) {
        error!(error = %e, "Failed to initialize metrics, continuing without metrics");
    }
}

/// Record the terminal outcome of an authentication attempt.
pub fn record_authentication(outcome: &'static str) {
    counter!(names::AUTHENTICATIONS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record a finished token lookup.
pub fn record_validation(lookup: &TokenLookup, duration_secs: f64) {
    histogram!(names::VALIDATION_DURATION_SECONDS).record(duration_secs);

    let reason = match lookup {
        TokenLookup::Resolved(_) => return,
        TokenLookup::NotFound(_) => "not_found",
        TokenLookup::Failed(err) if err.status >= 500 => "server_error",
        TokenLookup::Failed(_) => "rejected",
    };
    counter!(names::VALIDATION_FAILURES_TOTAL, "reason" => reason).increment(1);
}
