use axum::Json;
use axum::extract::Request;
use tracing::instrument;

use crate::models::WhoAmIResponse;
use crate::oauth::{AuthOutcome, CallerContextExt};

/// Report the identity the authentication middleware established.
///
/// Reads the trust headers exactly like any downstream handler would, so the
/// response shows what the rest of the application gets to see.
#[instrument(skip_all, fields(path = %request.uri().path()))]
pub async fn whoami(request: Request) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        caller_id: request.caller_id(),
        client_id: request.client_id(),
        public: request.is_public(),
        outcome: request.extensions().get::<AuthOutcome>().copied(),
    })
}
