//! Demo routing with the authentication middleware in front of every route.
//!
//! ```text
//! Request
//!    │
//!    ▼
//! ┌──────────────────┐
//! │  Authentication  │ ← strips trust headers, validates ?access_token
//! └────────┬─────────┘
//!          ▼
//! ┌──────────────────┐
//! │     Tracing      │ ← HTTP request/response logging
//! └────────┬─────────┘
//!          ▼
//!      Handler
//! ```
//!
//! - `/health` - liveness
//! - `/whoami` - identity as seen downstream

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers;
use crate::middleware::OAuthLayer;
use crate::oauth::Authenticator;
use crate::state::AppState;

/// Build the application router with the given authenticator.
///
/// Generic over [`Authenticator`] so tests can plug in
/// [`crate::testing::StubAuthenticator`] instead of the network-backed client.
pub fn build_router<A>(state: AppState, authenticator: A) -> Router
where
    A: Authenticator + 'static,
{
    let policy = state.config.auth_failure_policy;

    // Layers run bottom to top: authentication sees the request before tracing
    let router = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/whoami", get(handlers::whoami))
        .layer(TraceLayer::new_for_http())
        .layer(OAuthLayer::new(authenticator, policy));

    info!(%policy, "OAuth authentication enabled");

    router.with_state(state)
}
