use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::oauth::AuthOutcome;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status ("healthy")
    pub status: String,
    /// Application version
    pub version: String,
    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
    /// Seconds since the service started
    pub uptime_seconds: u64,
}

/// Identity as seen by a handler behind the authentication middleware.
#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    /// Value of `X-Caller-Id`, 0 when unauthenticated
    pub caller_id: i64,
    /// Value of `X-Client-Id`, 0 when unauthenticated
    pub client_id: i64,
    /// Whether the request carried `X-Public: true`
    pub public: bool,
    /// How the middleware classified the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<AuthOutcome>,
}
