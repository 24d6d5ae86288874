//! Consulta paginada de produtos na API v3 do Bling

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::utils::logging::*;
use crate::utils::{AppError, AppResult};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 5;

#[derive(Clone)]
pub struct ProductsClient {
    api_base_url: String,
    http_client: Client,
}

impl ProductsClient {
    pub fn new(api_base_url: &str, timeout_seconds: u64) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// GET /Api/v3/produtos?pagina=&limite=
    ///
    /// Devolve o JSON do Bling sem transformação.
    pub async fn get_products(&self, access_token: &str, page: u32, limit: u32) -> AppResult<Value> {
        let url = format!("{}/Api/v3/produtos", self.api_base_url);

        log_info(&format!("📦 [Bling] Buscando produtos - página {} (limite {})", page, limit));

        let response = self.http_client
            .get(&url)
            .query(&[("pagina", page.to_string()), ("limite", limit.to_string())])
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            log_bling_api_error(&url, Some(status.as_u16()), &error_text);
            return Err(AppError::upstream(Some(status.as_u16()), error_text));
        }

        let products: Value = response.json().await.map_err(|e| {
            AppError::upstream(Some(status.as_u16()), format!("Falha ao parsear produtos: {}", e))
        })?;

        Ok(products)
    }
}
