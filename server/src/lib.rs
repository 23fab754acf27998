pub mod auth;
pub mod database;
pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use sqlx::SqlitePool;

use shared::types::server_config::AppConfig;

use crate::auth::TokenCodec;

/// Shared, cheaply cloneable state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenCodec>,
}

impl AppState {
    /// Build the state, deriving the token codec from the `[auth]` section.
    pub fn new(db: SqlitePool, config: AppConfig) -> Result<Self> {
        let secret = config
            .auth
            .resolved_jwt_secret()
            .ok_or_else(|| anyhow!("No JWT secret configured"))?;
        let lifetime = Duration::from_secs(config.auth.token_expiry_secs());

        Ok(Self {
            db,
            tokens: Arc::new(TokenCodec::new(secret.as_bytes(), lifetime)),
            config: Arc::new(config),
        })
    }
}
