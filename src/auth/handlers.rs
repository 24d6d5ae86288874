//! OAuth2 HTTP Handlers
//!
//! Adaptadores HTTP finos sobre o `TokenManager`. Autenticação do chamador
//! fica a cargo da camada que monta o router.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::services::products::{DEFAULT_LIMIT, DEFAULT_PAGE};
use crate::services::ProductsClient;
use crate::store::TokenRecord;
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};
use super::{TokenManager, TokenResponse};

/// State compartilhado para os handlers OAuth2
pub struct OAuth2State {
    pub token_manager: Arc<TokenManager>,
    pub products: ProductsClient,
}

#[derive(Debug, Deserialize)]
pub struct SlugRequest {
    pub slug: String,
}

/// Corpo do callback repassado pelo frontend: `state` é o slug do tenant
#[derive(Debug, Deserialize)]
pub struct GetTokensRequest {
    pub code: String,
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub slug: String,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub fn bling_routes(state: Arc<OAuth2State>) -> Router {
    Router::new()
        .route("/bling/get-authorize-url", post(get_authorize_url))
        .route("/bling/get-tokens", post(get_tokens))
        .route("/bling/get-valid-access-token", post(get_valid_access_token))
        .route("/bling/products", get(list_products))
        .with_state(state)
}

/// POST /bling/get-authorize-url
pub async fn get_authorize_url(
    State(oauth_state): State<Arc<OAuth2State>>,
    payload: Result<Json<SlugRequest>, JsonRejection>,
) -> AppResult<Json<Value>> {
    log_request_received("/bling/get-authorize-url", "POST");
    let Json(body) = payload?;
    let slug = non_empty(&body.slug, "slug")?;

    let url = oauth_state.token_manager.build_authorize_url(slug);

    Ok(Json(json!({ "url": url })))
}

/// POST /bling/get-tokens
pub async fn get_tokens(
    State(oauth_state): State<Arc<OAuth2State>>,
    payload: Result<Json<GetTokensRequest>, JsonRejection>,
) -> AppResult<Json<TokenResponse>> {
    log_request_received("/bling/get-tokens", "POST");
    let Json(body) = payload?;
    let code = non_empty(&body.code, "code")?;
    let slug = non_empty(&body.state, "state")?;

    let tokens = oauth_state.token_manager.exchange_code(code, slug).await?;

    Ok(Json(tokens))
}

/// POST /bling/get-valid-access-token
pub async fn get_valid_access_token(
    State(oauth_state): State<Arc<OAuth2State>>,
    payload: Result<Json<SlugRequest>, JsonRejection>,
) -> AppResult<Json<TokenRecord>> {
    log_request_received("/bling/get-valid-access-token", "POST");
    let Json(body) = payload?;
    let slug = non_empty(&body.slug, "slug")?;

    let record = oauth_state.token_manager.get_valid_access_token(slug).await?;

    Ok(Json(record))
}

/// GET /bling/products?slug=acme&page=1&limit=5
pub async fn list_products(
    State(oauth_state): State<Arc<OAuth2State>>,
    query: Result<Query<ProductsQuery>, QueryRejection>,
) -> AppResult<Json<Value>> {
    log_request_received("/bling/products", "GET");
    let Query(params) = query?;
    let slug = non_empty(&params.slug, "slug")?;

    let access_token = oauth_state.token_manager.current_access_token(slug).await?;
    let products = oauth_state
        .products
        .get_products(
            &access_token,
            params.page.unwrap_or(DEFAULT_PAGE),
            params.limit.unwrap_or(DEFAULT_LIMIT),
        )
        .await?;

    Ok(Json(products))
}

fn non_empty<'a>(value: &'a str, field: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        log_validation_error(field, "vazio");
        return Err(AppError::ValidationError(format!("Campo '{}' obrigatório", field)));
    }
    Ok(trimmed)
}
