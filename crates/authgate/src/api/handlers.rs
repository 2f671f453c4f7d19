//! Request handlers.

use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::account::Account;
use crate::auth::RequestContext;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Identity of the authenticated caller.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub identity: Map<String, Value>,
    /// Bound account; absent for the testing bypass.
    pub account: Option<Account>,
}

/// Return the identity context attached by the gate.
pub async fn me(ctx: RequestContext) -> Json<MeResponse> {
    Json(MeResponse {
        success: true,
        identity: ctx.attributes().clone(),
        account: ctx.current_user().cloned(),
    })
}
