use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, Environment, File};
use std::collections::HashMap;

pub const DEFAULT_AUTH_BASE_URL: &str = "https://www.bling.com.br";
pub const DEFAULT_API_BASE_URL: &str = "https://api.bling.com.br";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub bling: BlingSettings,
    /// Diretório de tenants: slug → id interno
    #[serde(default)]
    pub tenants: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BlingSettings {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Host dos endpoints OAuth (authorize/token)
    pub auth_base_url: String,
    /// Host da API REST (produtos)
    pub api_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Devolver o registro renovado em vez do anterior ao refresh
    #[serde(default)]
    pub return_refreshed_token: bool,
}

fn default_timeout() -> u64 {
    30
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("bling.auth_base_url", DEFAULT_AUTH_BASE_URL)?
            .set_default("bling.api_base_url", DEFAULT_API_BASE_URL)?
            // Arquivo de configuração base
            .add_source(File::with_name("config/default").required(false))
            // Arquivo específico do ambiente
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false));

        // Variáveis de ambiente com os nomes usados no deploy
        if let Ok(client_id) = std::env::var("BLING_CLIENT_ID") {
            builder = builder.set_override("bling.client_id", client_id)?;
        }
        if let Ok(client_secret) = std::env::var("BLING_CLIENT_SECRET") {
            builder = builder.set_override("bling.client_secret", client_secret)?;
        }
        if let Ok(url) = std::env::var("BLING_AUTH_BASE_URL") {
            builder = builder.set_override("bling.auth_base_url", url)?;
        }
        if let Ok(url) = std::env::var("BLING_API_BASE_URL") {
            builder = builder.set_override("bling.api_base_url", url)?;
        }
        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }

        builder = builder.add_source(Environment::with_prefix("BLING_SERVICE").separator("__"));

        let s = builder.build()?;

        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bling_settings_defaults_from_partial_source() {
        let settings: BlingSettings = serde_json::from_value(serde_json::json!({
            "auth_base_url": DEFAULT_AUTH_BASE_URL,
            "api_base_url": DEFAULT_API_BASE_URL
        }))
        .unwrap();

        assert!(settings.client_id.is_none());
        assert!(settings.client_secret.is_none());
        assert_eq!(settings.timeout_seconds, 30);
        assert!(!settings.return_refreshed_token);
    }
}
