// src/web/membro_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::membro::{Membro, MembroPatch, MembroPayload},
    services::{
        membro_service::{self, Paginacao},
        token_service::Claims,
    },
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

// GET /api/membros/ (lista completa, ou paginada com ?page=)
pub async fn listar(
    State(state): State<AppState>,
    paginacao: Result<Query<Paginacao>, QueryRejection>,
) -> AppResult<Response> {
    // ?page=x responde com erro JSON, não com o texto do axum
    let Query(paginacao) = paginacao?;

    if paginacao.page.is_some() {
        let pagina = membro_service::listar_membros_paginado(&state.db_pool, paginacao).await?;
        tracing::debug!("GET /membros: página {} de {} membros", pagina.page, pagina.count);
        return Ok(Json(pagina).into_response());
    }

    // Sem ?page devolve o array completo
    let membros = membro_service::listar_membros(&state.db_pool).await?;
    Ok(Json(membros).into_response())
}

// POST /api/membros/
pub async fn criar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<MembroPayload>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Membro>)> {
    let Json(payload) = payload?;
    tracing::info!("POST /membros por {}", claims.username);

    // Validação, idade derivada e INSERT ficam no serviço
    let membro = membro_service::criar_membro(&state.db_pool, payload).await?;
    Ok((StatusCode::CREATED, Json(membro)))
}

// GET /api/membros/{id}/
pub async fn detalhe(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<Membro>> {
    let Path(id) = id?;
    membro_service::buscar_membro(&state.db_pool, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

// PUT /api/membros/{id}/
pub async fn atualizar(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MembroPayload>, JsonRejection>,
) -> AppResult<Json<Membro>> {
    let Path(id) = id?;
    let Json(payload) = payload?;
    tracing::info!("PUT /membros/{}", id);

    // Substituição completa; criado_em mantém-se
    let membro = membro_service::atualizar_membro(&state.db_pool, id, payload).await?;
    Ok(Json(membro))
}

// PATCH /api/membros/{id}/
pub async fn atualizar_parcial(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MembroPatch>, JsonRejection>,
) -> AppResult<Json<Membro>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    tracing::info!("PATCH /membros/{}", id);

    // Só os campos enviados mudam; null limpa campos opcionais
    let membro = membro_service::atualizar_membro_parcial(&state.db_pool, id, patch).await?;
    Ok(Json(membro))
}

// DELETE /api/membros/{id}/
pub async fn remover(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    tracing::info!("DELETE /membros/{} por {}", id, claims.username);
    membro_service::remover_membro(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
