//! Persistência dos tokens Bling por tenant
//!
//! O `TokenManager` só conhece as interfaces deste módulo:
//! - [`TokenRepository`]: leitura e upsert do registro de tokens de um tenant
//! - [`TenantResolver`]: tradução de slug público para id interno
//!
//! Qualquer backend (relacional, chave-valor) pode implementá-las, reportando
//! falhas de I/O como `AppError::StoreError`. O backend embarcado é o
//! [`InMemoryTokenRepository`].

mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::utils::AppResult;

pub use memory::{InMemoryTenantDirectory, InMemoryTokenRepository};

/// Identificador interno (opaco) de um tenant
pub type TenantId = String;

/// Tokens Bling de um tenant. No máximo um registro por tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    pub tenant_id: TenantId,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// `true` enquanto `now` for estritamente anterior a `expires_at`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Buscar o registro do tenant. Ausência é `Ok(None)`, não erro.
    async fn get_token_by_tenant_id(&self, tenant_id: &str) -> AppResult<Option<TokenRecord>>;

    /// Inserir ou substituir o registro do tenant
    async fn upsert_token(&self, record: &TokenRecord) -> AppResult<()>;
}

#[async_trait]
pub trait TenantResolver: Send + Sync {
    /// Resolver slug → id interno. Slug desconhecido é `Ok(None)`.
    async fn resolve_slug(&self, slug: &str) -> AppResult<Option<TenantId>>;
}

#[async_trait]
impl<T: TokenRepository + ?Sized> TokenRepository for Arc<T> {
    async fn get_token_by_tenant_id(&self, tenant_id: &str) -> AppResult<Option<TokenRecord>> {
        (**self).get_token_by_tenant_id(tenant_id).await
    }
    async fn upsert_token(&self, record: &TokenRecord) -> AppResult<()> {
        (**self).upsert_token(record).await
    }
}

#[async_trait]
impl<T: TenantResolver + ?Sized> TenantResolver for Arc<T> {
    async fn resolve_slug(&self, slug: &str) -> AppResult<Option<TenantId>> {
        (**self).resolve_slug(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_is_live_at_boundary() {
        let expires_at = Utc.with_ymd_and_hms(2025, 11, 3, 12, 0, 0).unwrap();
        let record = TokenRecord {
            tenant_id: "t-1".into(),
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at,
        };

        assert!(record.is_live_at(expires_at - Duration::seconds(1)));
        assert!(!record.is_live_at(expires_at));
        assert!(!record.is_live_at(expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_token_record_serializes_camel_case() {
        let record = TokenRecord {
            tenant_id: "t-1".into(),
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["tenantId"], "t-1");
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["refreshToken"], "r");
        assert!(json["expiresAt"].as_str().unwrap().starts_with("2025-01-01T00:00:00"));
    }
}
