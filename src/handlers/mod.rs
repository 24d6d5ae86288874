pub mod health;

pub use health::*;

// Handlers OAuth2 do Bling estão em src/auth/handlers.rs
