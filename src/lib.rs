// Biblioteca do serviço de tokens Bling
// Expõe módulos para uso em testes e no binário

pub mod auth;
pub mod config;
pub mod handlers;
pub mod services;
pub mod store;
pub mod utils;

use axum::{routing::get, Router};
use std::sync::Arc;

use auth::{OAuth2Config, OAuth2State, TokenManager};
use services::ProductsClient;
use store::{InMemoryTenantDirectory, InMemoryTokenRepository};
use utils::AppResult;

// AppState é definido aqui para ser compartilhado
pub struct AppState {
    pub settings: config::Settings,
    pub oauth: Arc<OAuth2State>,
}

impl AppState {
    /// Montar o estado com os backends em memória
    ///
    /// Falha com `ConfigError` se as credenciais do Bling não estiverem
    /// configuradas: o serviço não sobe sem elas.
    pub fn from_settings(settings: config::Settings) -> AppResult<Self> {
        let oauth_config = OAuth2Config::from_settings(&settings.bling)?;

        let tenants = Arc::new(InMemoryTenantDirectory::from_map(settings.tenants.clone()));
        let tokens = Arc::new(InMemoryTokenRepository::new());

        let products = ProductsClient::new(&oauth_config.api_base_url, oauth_config.timeout_seconds)?;
        let token_manager = TokenManager::new(oauth_config, tokens, tenants)?;

        Ok(Self {
            settings,
            oauth: Arc::new(OAuth2State {
                token_manager: Arc::new(token_manager),
                products,
            }),
        })
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state.clone())
        .merge(auth::bling_routes(state.oauth.clone()))
}
