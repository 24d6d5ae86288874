//! # Bling OAuth2 Authentication Module
//!
//! Módulo isolado para o fluxo OAuth2 com o ERP Bling.
//!
//! ## Responsabilidades:
//! - Montar a URL de autorização (slug do tenant como `state`)
//! - Trocar authorization code por access/refresh token
//! - Persistir os tokens por tenant e renová-los quando expiram
//!
//! ## Estrutura:
//! - `config.rs`: Credenciais e endpoints OAuth2
//! - `client.rs`: Cliente HTTP do endpoint de token
//! - `token_manager.rs`: Ciclo de vida dos tokens por tenant
//! - `handlers.rs`: Handlers HTTP

pub mod config;
pub mod client;
pub mod token_manager;
pub mod handlers;

pub use config::OAuth2Config;
pub use client::{OAuth2Client, TokenResponse};
pub use token_manager::TokenManager;
pub use handlers::{bling_routes, OAuth2State};
