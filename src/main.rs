/// Serviço de tokens Bling
///
/// - Monta a URL de autorização OAuth2 por tenant
/// - Troca o authorization code por tokens e salva por tenant
/// - Entrega access tokens válidos, renovando sob demanda quando expiram

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use bling_token_service::config::Settings;
use bling_token_service::utils::logging::*;
use bling_token_service::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 🔧 Carregar variáveis de ambiente do arquivo .env (se existir)
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bling_token_service=info,tower_http=info".into()),
        )
        .init();

    if dotenv_loaded {
        log_info("✅ Arquivo .env carregado com sucesso");
    } else {
        tracing::debug!("Arquivo .env não encontrado - usando variáveis de ambiente do sistema");
    }

    let settings = Settings::new().context("Failed to load settings")?;
    log_config_loaded(&std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string()));

    let host = settings.server.host.clone();
    let port = settings.server.port;
    log_server_startup(port);

    // Credenciais ausentes derrubam o processo aqui, não em uma requisição
    let state = AppState::from_settings(settings).context("Failed to initialize Bling OAuth2")?;
    log_info(&format!(
        "✅ OAuth2 TokenManager initialized ({} tenants)",
        state.settings.tenants.len()
    ));

    let app = build_router(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = TcpListener::bind((host.as_str(), port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    log_server_ready(&host, port);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
