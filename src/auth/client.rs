//! OAuth2 HTTP Client
//!
//! Cliente HTTP isolado para o endpoint de token do Bling (authorization_code
//! e refresh_token). Não conhece tenants nem persistência.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::utils::logging::*;
use crate::utils::{mask_token, AppError, AppResult};
use super::OAuth2Config;

/// Maior validade aceita para um access token (1 ano)
pub const MAX_EXPIRES_IN_SECONDS: i64 = 365 * 24 * 60 * 60;

/// Resposta do endpoint de token
///
/// Além dos campos consumidos, qualquer metadado devolvido pelo Bling
/// (`token_type`, `scope`, ...) é preservado em `extra` e repassado ao chamador.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Validade do access token, em segundos
    pub expires_in: i64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Cliente OAuth2 para o Bling
pub struct OAuth2Client {
    config: OAuth2Config,
    http_client: Client,
}

impl OAuth2Client {
    /// Criar novo cliente OAuth2
    pub fn new(config: OAuth2Config) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &OAuth2Config {
        &self.config
    }

    /// Trocar authorization code por access/refresh token
    ///
    /// # Retorno
    /// - `Ok(TokenResponse)`: Tokens obtidos com sucesso
    /// - `Err(AppError::Upstream)`: Bling recusou ou devolveu payload inválido
    pub async fn exchange_code_for_token(&self, code: &str) -> AppResult<TokenResponse> {
        log_info(&format!("🔐 [OAuth2] Trocando authorization code por tokens (code: {})",
            mask_token(code, 6)));

        self.request_token(&[("grant_type", "authorization_code"), ("code", code)])
            .await
    }

    /// Obter novo access token a partir do refresh token
    pub async fn refresh_access_token(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        log_info(&format!("🔄 [OAuth2] Renovando access token (refresh: {})",
            mask_token(refresh_token, 6)));

        self.request_token(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> AppResult<TokenResponse> {
        let url = self.config.token_url();

        let response = self.http_client
            .post(&url)
            .header("Accept", "1.0")
            .header("Authorization", self.config.basic_authorization())
            .form(form)
            .send()
            .await
            .map_err(|e| {
                log_bling_api_error(&url, None, &e.to_string());
                AppError::HttpError(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            log_bling_api_error(&url, Some(status.as_u16()), &e.to_string());
            AppError::HttpError(e)
        })?;

        if !status.is_success() {
            log_bling_api_error(&url, Some(status.as_u16()), &body);
            return Err(AppError::upstream(Some(status.as_u16()), body));
        }

        let tokens: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            log_error(&format!("❌ [OAuth2] Resposta de token inválida: {}", e));
            AppError::upstream(
                Some(status.as_u16()),
                format!("Falha ao parsear resposta do token: {}", e),
            )
        })?;

        if !(1..=MAX_EXPIRES_IN_SECONDS).contains(&tokens.expires_in) {
            log_error(&format!("❌ [OAuth2] expires_in fora do intervalo: {}", tokens.expires_in));
            return Err(AppError::upstream(
                Some(status.as_u16()),
                format!("expires_in inválido na resposta do token: {}", tokens.expires_in),
            ));
        }

        log_info(&format!("✅ [OAuth2] Access token obtido: {} (expira em {}s)",
            mask_token(&tokens.access_token, 8), tokens.expires_in));

        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_preserves_metadata() {
        let body = r#"{
            "access_token": "at-1",
            "refresh_token": "rt-1",
            "expires_in": 21600,
            "token_type": "Bearer",
            "scope": "98309 5990556"
        }"#;

        let tokens: TokenResponse = serde_json::from_str(body).unwrap();
        assert_eq!(tokens.access_token, "at-1");
        assert_eq!(tokens.refresh_token, "rt-1");
        assert_eq!(tokens.expires_in, 21600);
        assert_eq!(tokens.extra["token_type"], "Bearer");

        let round = serde_json::to_value(&tokens).unwrap();
        assert_eq!(round["scope"], "98309 5990556");
        assert_eq!(round["expires_in"], 21600);
    }

    #[test]
    fn test_token_response_requires_refresh_token() {
        let body = r#"{"access_token": "at-1", "expires_in": 3600}"#;
        assert!(serde_json::from_str::<TokenResponse>(body).is_err());
    }

    #[tokio::test]
    async fn test_truncated_body_is_transport_error() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            // Content-Length maior que o corpo enviado
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 200\r\n\r\n{\"access_token\"")
                .await;
            let _ = socket.shutdown().await;
        });

        let client = OAuth2Client::new(OAuth2Config {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            auth_base_url: format!("http://{}", addr),
            api_base_url: format!("http://{}", addr),
            timeout_seconds: 5,
            return_refreshed_token: false,
        })
        .unwrap();

        let err = client.exchange_code_for_token("code").await.unwrap_err();
        assert!(matches!(err, AppError::HttpError(_)), "obtido {:?}", err);
    }
}
