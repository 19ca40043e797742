// src/web/usuario_handlers.rs
// Administração de contas. Todas as rotas passam por require_auth e require_superuser.
use crate::{
    error::{AppError, AppResult},
    models::usuario::{NovoUsuario, UsuarioDetalhe, UsuarioPatch},
    services::{token_service::Claims, usuario_service},
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Extension, Path, State,
    },
    http::StatusCode,
    Json,
};

// GET /api/usuarios/
pub async fn listar(State(state): State<AppState>) -> AppResult<Json<Vec<UsuarioDetalhe>>> {
    let usuarios = usuario_service::find_all_usuarios(&state.db_pool).await?;
    // Nunca expõe o password_hash
    Ok(Json(usuarios.into_iter().map(UsuarioDetalhe::from).collect()))
}

// POST /api/usuarios/
pub async fn criar(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<NovoUsuario>, JsonRejection>,
) -> AppResult<(StatusCode, Json<UsuarioDetalhe>)> {
    let Json(novo) = payload?;
    tracing::info!("POST /usuarios: {} cria '{}'", claims.username, novo.username);

    // Validação e hash da senha ficam no serviço
    let usuario = usuario_service::create_usuario(&state.db_pool, novo, state.bcrypt_cost).await?;
    Ok((StatusCode::CREATED, Json(UsuarioDetalhe::from(usuario))))
}

// PATCH /api/usuarios/{id}/
pub async fn atualizar(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UsuarioPatch>, JsonRejection>,
) -> AppResult<Json<UsuarioDetalhe>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let usuario = usuario_service::update_usuario(&state.db_pool, id, patch, state.bcrypt_cost).await?;
    Ok(Json(UsuarioDetalhe::from(usuario)))
}

// DELETE /api/usuarios/{id}/
pub async fn remover(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    id: Result<Path<i64>, PathRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;

    // Impede que o admin fique sem acesso
    if claims.user_id == id {
        tracing::warn!("{} tentou apagar a própria conta.", claims.username);
        return Err(AppError::campo("non_field_errors", "Não é possível apagar a própria conta."));
    }

    // Membros associados ficam com usuario_responsavel = NULL
    usuario_service::delete_usuario(&state.db_pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
