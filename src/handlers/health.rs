use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::utils::logging::*;
use crate::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    log_health_check();

    let oauth = state.oauth.token_manager.config();

    Json(json!({
        "status": "healthy",
        "service": "bling-token-service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "bling": {
            "auth_base_url": oauth.auth_base_url,
            "api_base_url": oauth.api_base_url,
            "tenants_configured": state.settings.tenants.len()
        }
    }))
}
