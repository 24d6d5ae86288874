//! Backends em memória para tokens e diretório de tenants

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{TenantId, TenantResolver, TokenRecord, TokenRepository};
use crate::utils::AppResult;

/// Tokens mantidos em memória, indexados por tenant
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    records: RwLock<HashMap<TenantId, TokenRecord>>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn get_token_by_tenant_id(&self, tenant_id: &str) -> AppResult<Option<TokenRecord>> {
        Ok(self.records.read().await.get(tenant_id).cloned())
    }

    async fn upsert_token(&self, record: &TokenRecord) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(record.tenant_id.clone(), record.clone());
        Ok(())
    }
}

/// Diretório slug → tenant id
#[derive(Debug, Default)]
pub struct InMemoryTenantDirectory {
    tenants: RwLock<HashMap<String, TenantId>>,
}

impl InMemoryTenantDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(tenants: HashMap<String, TenantId>) -> Self {
        Self {
            tenants: RwLock::new(tenants),
        }
    }

    /// Cadastrar um slug com id gerado (UUID v4). Slug existente mantém o id.
    pub async fn register(&self, slug: &str) -> TenantId {
        self.tenants
            .write()
            .await
            .entry(slug.to_string())
            .or_insert_with(|| Uuid::new_v4().to_string())
            .clone()
    }

    pub async fn insert(&self, slug: &str, tenant_id: &str) {
        self.tenants
            .write()
            .await
            .insert(slug.to_string(), tenant_id.to_string());
    }
}

#[async_trait]
impl TenantResolver for InMemoryTenantDirectory {
    async fn resolve_slug(&self, slug: &str) -> AppResult<Option<TenantId>> {
        Ok(self.tenants.read().await.get(slug).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(tenant_id: &str, access: &str) -> TokenRecord {
        TokenRecord {
            tenant_id: tenant_id.to_string(),
            access_token: access.to_string(),
            refresh_token: format!("{}-refresh", access),
            expires_at: Utc::now() + Duration::hours(6),
        }
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_record() {
        let repo = InMemoryTokenRepository::new();
        assert!(repo.get_token_by_tenant_id("t-1").await.unwrap().is_none());

        repo.upsert_token(&record("t-1", "first")).await.unwrap();
        repo.upsert_token(&record("t-1", "second")).await.unwrap();

        assert_eq!(repo.len().await, 1);
        let stored = repo.get_token_by_tenant_id("t-1").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "second");
        assert_eq!(stored.refresh_token, "second-refresh");
    }

    #[tokio::test]
    async fn test_records_are_isolated_per_tenant() {
        let repo = InMemoryTokenRepository::new();
        repo.upsert_token(&record("t-1", "one")).await.unwrap();
        repo.upsert_token(&record("t-2", "two")).await.unwrap();

        assert_eq!(repo.len().await, 2);
        assert_eq!(
            repo.get_token_by_tenant_id("t-2").await.unwrap().unwrap().access_token,
            "two"
        );
    }

    #[tokio::test]
    async fn test_tenant_directory_register_is_stable() {
        let directory = InMemoryTenantDirectory::new();
        let id = directory.register("acme").await;

        assert_eq!(directory.register("acme").await, id);
        assert_eq!(directory.resolve_slug("acme").await.unwrap(), Some(id));
        assert_eq!(directory.resolve_slug("globex").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_tenant_directory_from_map() {
        let mut tenants = HashMap::new();
        tenants.insert("acme".to_string(), "org-42".to_string());
        let directory = InMemoryTenantDirectory::from_map(tenants);

        assert_eq!(
            directory.resolve_slug("acme").await.unwrap(),
            Some("org-42".to_string())
        );
    }
}
