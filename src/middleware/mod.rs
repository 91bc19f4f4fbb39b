//! HTTP middleware.
//!
//! ```text
//! Request → OAuthLayer → Handler → Response
//!               ↓
//!       strip trust headers, validate token,
//!       stamp X-Caller-Id / X-Client-Id
//! ```

pub mod auth;

pub use auth::{FailurePolicy, OAuthLayer, OAuthService};
