//! Token Manager
//!
//! Ciclo de vida dos tokens Bling por tenant:
//! `SemToken → Válido → Expirado → Válido (após refresh)`.
//!
//! - `exchange_code` cria/substitui o registro do tenant
//! - `get_valid_access_token` devolve o registro salvo enquanto ele for válido
//!   e renova sob demanda quando expira; não há renovação em background
//!
//! Renovações concorrentes do mesmo tenant são serializadas: quem espera o
//! lock relê o registro e só chama o Bling se ele continuar expirado.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::store::{TenantId, TenantResolver, TokenRecord, TokenRepository};
use crate::utils::logging::*;
use crate::utils::{AppError, AppResult, Clock, SystemClock};
use super::{OAuth2Client, OAuth2Config, TokenResponse};

/// Gerenciador de tokens OAuth2
pub struct TokenManager {
    oauth_client: OAuth2Client,
    tokens: Arc<dyn TokenRepository>,
    tenants: Arc<dyn TenantResolver>,
    clock: Arc<dyn Clock>,
    refresh_locks: Mutex<HashMap<TenantId, Arc<Mutex<()>>>>,
}

impl TokenManager {
    /// Criar novo gerenciador de tokens com o relógio do sistema
    pub fn new(
        config: OAuth2Config,
        tokens: Arc<dyn TokenRepository>,
        tenants: Arc<dyn TenantResolver>,
    ) -> AppResult<Self> {
        Ok(Self {
            oauth_client: OAuth2Client::new(config)?,
            tokens,
            tenants,
            clock: Arc::new(SystemClock),
            refresh_locks: Mutex::new(HashMap::new()),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &OAuth2Config {
        self.oauth_client.config()
    }

    /// URL de autorização do Bling com o slug como `state`
    pub fn build_authorize_url(&self, tenant_slug: &str) -> String {
        self.config().authorization_url(tenant_slug)
    }

    /// Trocar o authorization code pelos tokens e salvá-los para o tenant
    ///
    /// O slug é resolvido antes de qualquer chamada ao Bling: slug
    /// desconhecido falha com `NotFound` sem consumir o code.
    ///
    /// # Retorno
    /// - `Ok(TokenResponse)`: resposta do Bling, sem alterações
    /// - `Err(AppError::NotFound)`: tenant inexistente
    /// - `Err(AppError::Upstream)`: Bling recusou o code
    pub async fn exchange_code(&self, code: &str, tenant_slug: &str) -> AppResult<TokenResponse> {
        let tenant_id = self.resolve_tenant(tenant_slug).await?;

        let tokens = self.oauth_client.exchange_code_for_token(code).await?;

        let record = self.build_record(&tenant_id, &tokens)?;
        self.tokens.upsert_token(&record).await?;
        log_token_stored(&tenant_id, &record.expires_at.to_rfc3339());

        Ok(tokens)
    }

    /// Obter o registro de tokens do tenant, renovando se estiver expirado
    ///
    /// Enquanto `now < expires_at` nenhuma chamada de rede é feita.
    ///
    /// Após um refresh bem-sucedido o registro **anterior** ao refresh é
    /// devolvido, a menos que `return_refreshed_token` esteja ativo.
    pub async fn get_valid_access_token(&self, tenant_slug: &str) -> AppResult<TokenRecord> {
        let tenant_id = self.resolve_tenant(tenant_slug).await?;

        let current = self.load_record(&tenant_id).await?;
        if current.is_live_at(self.clock.now()) {
            return Ok(current);
        }

        let lock = self.refresh_lock(&tenant_id).await;
        let _guard = lock.lock().await;

        let current = self.load_record(&tenant_id).await?;
        if current.is_live_at(self.clock.now()) {
            log_info(&format!("✅ [TokenManager] Token do tenant {} já renovado por outra requisição", tenant_id));
            return Ok(current);
        }

        log_info(&format!("⌛ [TokenManager] Token do tenant {} expirou em {}",
            tenant_id, current.expires_at.to_rfc3339()));

        let tokens = self.oauth_client
            .refresh_access_token(&current.refresh_token)
            .await
            .map_err(|e| {
                log_error(&format!("❌ [TokenManager] Falha ao renovar token do tenant {}: {}", tenant_id, e));
                e
            })?;

        let refreshed = self.build_record(&tenant_id, &tokens)?;
        self.tokens.upsert_token(&refreshed).await?;
        log_token_refreshed(&tenant_id, &refreshed.expires_at.to_rfc3339());

        if self.config().return_refreshed_token {
            Ok(refreshed)
        } else {
            Ok(current)
        }
    }

    /// Access token utilizável agora, para chamadas internas à API do Bling
    ///
    /// Passa por `get_valid_access_token` (que renova se preciso) e relê o
    /// registro salvo, sempre obtendo o token vigente independentemente do
    /// contrato de retorno daquela operação.
    pub async fn current_access_token(&self, tenant_slug: &str) -> AppResult<String> {
        let record = self.get_valid_access_token(tenant_slug).await?;
        let stored = self.load_record(&record.tenant_id).await?;
        Ok(stored.access_token)
    }

    async fn resolve_tenant(&self, tenant_slug: &str) -> AppResult<TenantId> {
        self.tenants
            .resolve_slug(tenant_slug)
            .await?
            .ok_or_else(|| {
                log_warning(&format!("⚠️ [TokenManager] Organização não encontrada: {}", tenant_slug));
                AppError::not_found(format!("Organização não encontrada: {}", tenant_slug))
            })
    }

    async fn load_record(&self, tenant_id: &str) -> AppResult<TokenRecord> {
        self.tokens
            .get_token_by_tenant_id(tenant_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Token não encontrado para o tenant {}", tenant_id)))
    }

    fn build_record(&self, tenant_id: &str, tokens: &TokenResponse) -> AppResult<TokenRecord> {
        let expires_at = Duration::try_seconds(tokens.expires_in)
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::upstream(None, format!("expires_in fora do intervalo: {}", tokens.expires_in))
            })?;

        Ok(TokenRecord {
            tenant_id: tenant_id.to_string(),
            access_token: tokens.access_token.clone(),
            refresh_token: tokens.refresh_token.clone(),
            expires_at,
        })
    }

    async fn refresh_lock(&self, tenant_id: &str) -> Arc<Mutex<()>> {
        self.refresh_locks
            .lock()
            .await
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryTenantDirectory, InMemoryTokenRepository};

    fn config() -> OAuth2Config {
        OAuth2Config {
            client_id: "client-123".to_string(),
            client_secret: "secret".to_string(),
            // Porta 9 (discard): qualquer chamada de rede indevida falha
            auth_base_url: "http://127.0.0.1:9".to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
            timeout_seconds: 1,
            return_refreshed_token: false,
        }
    }

    #[tokio::test]
    async fn test_build_authorize_url_uses_slug_as_state() {
        let manager = TokenManager::new(
            config(),
            Arc::new(InMemoryTokenRepository::new()),
            Arc::new(InMemoryTenantDirectory::new()),
        )
        .unwrap();

        let url = manager.build_authorize_url("acme");
        assert!(url.starts_with("http://127.0.0.1:9/Api/v3/oauth/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.ends_with("state=acme"));
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let repo = Arc::new(InMemoryTokenRepository::new());
        let manager = TokenManager::new(
            config(),
            repo.clone(),
            Arc::new(InMemoryTenantDirectory::new()),
        )
        .unwrap();

        let err = manager.exchange_code("code", "ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = manager.get_valid_access_token("ghost").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(repo.is_empty().await);
    }

    #[test]
    fn test_build_record_rejects_expiry_past_max_date() {
        use crate::utils::FixedClock;
        use chrono::{DateTime, Utc};

        let manager = TokenManager::new(
            config(),
            Arc::new(InMemoryTokenRepository::new()),
            Arc::new(InMemoryTenantDirectory::new()),
        )
        .unwrap()
        .with_clock(Arc::new(FixedClock::new(DateTime::<Utc>::MAX_UTC)));

        let tokens = TokenResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 3600,
            extra: serde_json::Map::new(),
        };

        let err = manager.build_record("t-1", &tokens).unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));
    }
}
