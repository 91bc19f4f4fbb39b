//! Outbound token lookup against the OAuth introspection endpoint.
//!
//! One `GET {base_url}/oauth/access_token/{token}` per call, bounded by the
//! configured timeout. The response is folded into a [`TokenLookup`]:
//!
//! | Remote outcome                      | Result                          |
//! |-------------------------------------|---------------------------------|
//! | token is `.` or `..` (not sent)     | `Failed(400)`                   |
//! | no response, timeout, body error    | `Failed(500)`                   |
//! | status > 299, undecodable body      | `Failed(500)`                   |
//! | status > 299, error with code 404   | `NotFound(remote error)`        |
//! | status > 299, any other error       | `Failed(remote error)` verbatim |
//! | status <= 299, undecodable body     | `Failed(500)`                   |
//! | status <= 299, valid token          | `Resolved(token)`               |
//!
//! No retries happen here; a failed lookup is final for the request.

use std::time::Instant;

use tracing::{debug, warn};
use url::Url;

use crate::config::OAuthSettings;
use crate::error::{AppResult, ErrorKind, RestError};
use crate::metrics;

use super::token::{AccessToken, TokenLookup};

/// Cause attached to every transport-level failure.
pub const INVALID_CLIENT_RESPONSE: &str = "invalid rest client response";

/// Client for the token introspection endpoint.
///
/// Cheap to clone: the underlying `reqwest::Client` shares its connection pool.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    http: reqwest::Client,
    base_url: Url,
}

impl TokenValidator {
    /// Build a validator from explicit settings.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` for an unusable base URL and
    /// `AppError::HttpClient` if the HTTP client cannot be constructed.
    pub fn new(settings: &OAuthSettings) -> AppResult<Self> {
        let base_url = settings.parsed_base_url()?;
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Look up a token.
    pub async fn validate(&self, token: &str) -> TokenLookup {
        let started = Instant::now();
        let lookup = self.lookup(token).await;
        metrics::record_validation(&lookup, started.elapsed().as_secs_f64());
        lookup
    }

    async fn lookup(&self, token: &str) -> TokenLookup {
        let url = match self.token_url(token) {
            Ok(url) => url,
            Err(err) => return TokenLookup::Failed(err),
        };

        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, timeout = e.is_timeout(), "Token introspection request failed");
                return TokenLookup::Failed(transport_error());
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, %status, "Failed to read token introspection response");
                return TokenLookup::Failed(transport_error());
            }
        };

        if status.as_u16() > 299 {
            return match serde_json::from_slice::<RestError>(&body) {
                Ok(remote) if remote.kind() == ErrorKind::NotFound => {
                    debug!(message = %remote.message, "Access token not found");
                    TokenLookup::NotFound(remote)
                }
                Ok(remote) => {
                    warn!(
                        %status,
                        code = remote.status,
                        message = %remote.message,
                        "Introspection service rejected access token"
                    );
                    TokenLookup::Failed(remote)
                }
                Err(e) => {
                    warn!(error = %e, %status, "Undecodable error from introspection service");
                    TokenLookup::Failed(RestError::internal_server_error(
                        "invalid error interface while trying to unmarshal access token",
                        e,
                    ))
                }
            };
        }

        match serde_json::from_slice::<AccessToken>(&body) {
            Ok(token) => TokenLookup::Resolved(token),
            Err(e) => {
                warn!(error = %e, %status, "Undecodable access token from introspection service");
                TokenLookup::Failed(RestError::internal_server_error(
                    "error while trying to unmarshal access token",
                    e,
                ))
            }
        }
    }

    /// `{base_url}/oauth/access_token/{token}` with the token as one encoded segment.
    ///
    /// `.` and `..` are dropped by URL normalization and would address a
    /// different resource, so they are refused.
    fn token_url(&self, token: &str) -> Result<Url, RestError> {
        if is_dot_segment(token) {
            return Err(RestError::bad_request(
                "invalid access token",
                "access token cannot be a relative path segment",
            ));
        }

        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|()| {
                RestError::internal_server_error(
                    "invalid introspection url while trying to get access token",
                    INVALID_CLIENT_RESPONSE,
                )
            })?
            .pop_if_empty()
            .extend(["oauth", "access_token", token]);
        Ok(url)
    }
}

fn is_dot_segment(token: &str) -> bool {
    matches!(token, "." | "..")
}

fn transport_error() -> RestError {
    RestError::internal_server_error(
        "invalid rest client response while trying to get access token",
        INVALID_CLIENT_RESPONSE,
    )
}
