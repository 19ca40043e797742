// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::{LoginPayload, RefreshPayload, UsuarioPerfil, UsuarioResumo},
    services::{auth_service, token_service::Claims, usuario_service},
    state::AppState,
};
use axum::{
    extract::{rejection::JsonRejection, Extension, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UsuarioResumo,
}

// POST /api/token/
pub async fn obter_token(
    State(state): State<AppState>,
    payload: Result<Json<LoginPayload>, JsonRejection>,
) -> AppResult<Json<LoginResponse>> {
    let Json(form) = payload?;
    tracing::debug!("POST /token: tentativa de login para {}", form.username);

    // Mesma resposta para usuário inexistente, senha errada ou conta inativa
    let usuario =
        auth_service::autenticar(&state.db_pool, &form.username, &form.password, state.bcrypt_cost)
            .await?;
    // Access + refresh com as mesmas claims de identidade
    let par = state.tokens.emitir_par(&usuario)?;
    tracing::info!("✅ Login bem-sucedido para {}", usuario.username);
    Ok(Json(LoginResponse {
        access: par.access,
        refresh: par.refresh,
        user: UsuarioResumo::from(&usuario),
    }))
}

// POST /api/token/refresh/
pub async fn renovar_token(
    State(state): State<AppState>,
    payload: Result<Json<RefreshPayload>, JsonRejection>,
) -> AppResult<Json<Value>> {
    let Json(form) = payload?;
    // Só aceita tokens com token_type = "refresh"
    let access = state.tokens.renovar_access(&form.refresh)?;
    tracing::debug!("Access token renovado.");
    Ok(Json(json!({ "access": access })))
}

// GET /api/me/
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UsuarioPerfil>> {
    tracing::debug!("GET /me: acesso para {}", claims.username);
    let usuario = usuario_service::find_usuario_by_id(&state.db_pool, claims.user_id)
        .await?
        .ok_or_else(|| {
            // Token válido para uma conta que já não existe
            tracing::warn!("user_id {} autenticado não encontrado na DB.", claims.user_id);
            AppError::Unauthorized
        })?;
    Ok(Json(UsuarioPerfil::from(&usuario)))
}
