// src/state.rs
use crate::{
    config::{Config, DashboardConfig},
    services::token_service::TokenService,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub tokens: TokenService,
    // Partilhado entre pedidos, nunca alterado depois do arranque
    pub dashboard: Arc<DashboardConfig>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(db_pool: SqlitePool, config: &Config) -> Self {
        Self {
            db_pool,
            tokens: TokenService::new(
                &config.jwt_secret,
                Duration::minutes(config.access_token_minutes),
                Duration::days(config.refresh_token_days),
            ),
            dashboard: Arc::new(config.dashboard.clone()),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

// Permite extrair o pool da DB diretamente
impl axum::extract::FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> SqlitePool {
        state.db_pool.clone()
    }
}

impl axum::extract::FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> TokenService {
        state.tokens.clone()
    }
}
