//! OAuth2 Configuration
//!
//! Credenciais e endpoints do Bling, validados uma única vez na inicialização

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

use crate::config::BlingSettings;
use crate::utils::{AppError, AppResult};

const AUTHORIZE_PATH: &str = "/Api/v3/oauth/authorize";
const TOKEN_PATH: &str = "/Api/v3/oauth/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Config {
    /// Client ID do aplicativo cadastrado no Bling
    pub client_id: String,

    /// Client Secret do aplicativo cadastrado no Bling
    pub client_secret: String,

    /// Host dos endpoints OAuth (ex: https://www.bling.com.br)
    pub auth_base_url: String,

    /// Host da API REST (ex: https://api.bling.com.br)
    pub api_base_url: String,

    pub timeout_seconds: u64,

    /// Devolver o registro novo após refresh (padrão: devolve o anterior)
    pub return_refreshed_token: bool,
}

impl OAuth2Config {
    /// Montar a configuração a partir dos settings carregados
    ///
    /// Falha com `ConfigError` se `client_id` ou `client_secret` estiverem
    /// ausentes ou vazios. É um erro de implantação, não de requisição.
    pub fn from_settings(settings: &BlingSettings) -> AppResult<Self> {
        let client_id = required(settings.client_id.as_deref(), "BLING_CLIENT_ID")?;
        let client_secret = required(settings.client_secret.as_deref(), "BLING_CLIENT_SECRET")?;

        Ok(Self {
            client_id,
            client_secret,
            auth_base_url: trim_base(&settings.auth_base_url),
            api_base_url: trim_base(&settings.api_base_url),
            timeout_seconds: settings.timeout_seconds,
            return_refreshed_token: settings.return_refreshed_token,
        })
    }

    /// Gerar URL de autorização do Bling
    ///
    /// O slug do tenant vai como `state` e volta intacto no callback.
    pub fn authorization_url(&self, state: &str) -> String {
        format!(
            "{}{}?response_type=code&client_id={}&state={}",
            self.auth_base_url,
            AUTHORIZE_PATH,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(state)
        )
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.auth_base_url, TOKEN_PATH)
    }

    /// Valor do header `Authorization` para o endpoint de token
    pub fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", general_purpose::STANDARD.encode(credentials))
    }
}

fn required(value: Option<&str>, name: &str) -> AppResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AppError::ConfigError(format!("{} não definido", name))),
    }
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
