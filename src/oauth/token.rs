use serde::{Deserialize, Serialize};

use crate::error::RestError;

/// Token introspection result as returned by the OAuth service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub user_id: i64,
    /// Kind of client the token was issued to (web frontend, mobile app, ...)
    pub client_id: i64,
    /// Expiration as a unix timestamp
    pub expires: i64,
}

/// Trusted identity stamped on a request after successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub caller_id: i64,
    pub client_id: i64,
}

impl From<&AccessToken> for Identity {
    fn from(token: &AccessToken) -> Self {
        Self {
            caller_id: token.user_id,
            client_id: token.client_id,
        }
    }
}

/// Result of asking the introspection service about a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenLookup {
    Resolved(AccessToken),
    /// The service does not know the token. Treated as "no token".
    NotFound(RestError),
    Failed(RestError),
}

/// Why a request ended up without identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnonymousReason {
    NoRequest,
    MissingToken,
    TokenNotFound,
    /// Validation failed and the middleware was told to continue anyway
    ValidationFailed,
}

/// Terminal state of a successful `authenticate_request` call.
///
/// Stored in request extensions by [`crate::middleware::OAuthLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthOutcome {
    Authenticated(Identity),
    Anonymous { reason: AnonymousReason },
}

impl AuthOutcome {
    pub fn anonymous(reason: AnonymousReason) -> Self {
        Self::Anonymous { reason }
    }

    pub fn identity(&self) -> Option<Identity> {
        match self {
            Self::Authenticated(identity) => Some(*identity),
            Self::Anonymous { .. } => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

/// Result type of [`crate::oauth::Authenticator::authenticate_request`].
pub type AuthResult = Result<AuthOutcome, RestError>;
