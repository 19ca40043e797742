// src/web/dashboard_handlers.rs
use crate::{
    error::AppResult, models::dashboard::Dashboard, services::dashboard_service, state::AppState,
};
use axum::{extract::State, Json};
use serde_json::{json, Value};

// GET /
pub async fn home() -> Json<Value> {
    Json(json!({ "mensagem": "API da Igreja - Backend Online" }))
}

// GET /api/test/
pub async fn test_conexao() -> Json<Value> {
    Json(json!({ "mensagem": "Backend acessível com CORS OK" }))
}

// GET /api/dashboard/
pub async fn dashboard(State(state): State<AppState>) -> AppResult<Json<Dashboard>> {
    // Todas as contagens saem da mesma transação de leitura
    let dashboard = dashboard_service::gerar_dashboard(&state.db_pool, &state.dashboard).await?;
    Ok(Json(dashboard))
}
