//! # oauth_gate
//!
//! Access-token authentication middleware for Axum. Resolves an
//! `access_token` query parameter against a remote OAuth introspection
//! service and stamps the trusted caller/client identity onto the request:
//!
//! - **Sanitization**: forged `X-Caller-Id` / `X-Client-Id` headers are always removed
//! - **Bounded lookups**: one outbound call per request under a fixed timeout
//! - **Soft failures**: missing or unknown tokens continue anonymously
//! - **Observability**: structured logging and Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │              OAuthLayer (tower middleware)                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Authenticator: OAuthClient | testing::StubAuthenticator    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TokenValidator (reqwest, fixed timeout)                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  OAuth service: GET /oauth/access_token/{token}             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use oauth_gate::config::OAuthSettings;
//! use oauth_gate::middleware::{FailurePolicy, OAuthLayer};
//! use oauth_gate::oauth::OAuthClient;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OAuthClient::new(&OAuthSettings::default())?;
//! let app: Router = Router::new()
//!     .route("/", get(|| async { "hello" }))
//!     .layer(OAuthLayer::new(client, FailurePolicy::Reject));
//! # Ok(())
//! # }
//! ```
//!
//! Handlers then read identity with [`oauth::CallerContextExt`].

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod routes;
pub mod state;
pub mod testing;
pub mod utils;

// Re-exports for convenience
pub use config::{Config, OAuthSettings};
pub use error::{AppError, AppResult, ErrorKind, RestError};
pub use oauth::{AuthOutcome, Authenticator, OAuthClient};
pub use routes::build_router;
pub use state::AppState;
