use tracing::{debug, error, info, warn};

pub fn log_request_received(endpoint: &str, method: &str) {
    info!("Request received: {} {}", method, endpoint);
}

pub fn log_bling_api_error(endpoint: &str, status: Option<u16>, error: &str) {
    error!("Bling API error: {} - Status: {:?} - Error: {}", endpoint, status, error);
}

pub fn log_token_stored(tenant_id: &str, expires_at: &str) {
    info!("💾 Tokens Bling salvos - tenant: {} - expira em: {}", tenant_id, expires_at);
}

pub fn log_token_refreshed(tenant_id: &str, expires_at: &str) {
    info!("🔄 Access token renovado - tenant: {} - nova expiração: {}", tenant_id, expires_at);
}

pub fn log_config_loaded(env: &str) {
    info!("Configuration loaded successfully for environment: {}", env);
}

pub fn log_server_startup(port: u16) {
    info!("🚀 Bling token service starting on port {}", port);
}

pub fn log_server_ready(host: &str, port: u16) {
    info!("✅ Server ready and listening on http://{}:{}", host, port);
}

pub fn log_health_check() {
    debug!("Health check requested");
}

pub fn log_validation_error(field: &str, message: &str) {
    warn!("Validation error: {} - {}", field, message);
}

pub fn log_info(message: &str) {
    info!("{}", message);
}

pub fn log_error(message: &str) {
    error!("{}", message);
}

pub fn log_warning(message: &str) {
    warn!("{}", message);
}
