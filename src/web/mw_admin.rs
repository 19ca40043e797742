// src/web/mw_admin.rs
use crate::{error::AppError, services::token_service::Claims};
use axum::{
    extract::{Extension, Request},
    middleware::Next,
    response::Response,
};

/// Middleware que exige `is_superuser` nas claims do token.
/// Deve ser executado *depois* do middleware `require_auth`.
pub async fn require_superuser(
    Extension(claims): Extension<Claims>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if claims.is_superuser {
        tracing::debug!("Admin MW: acesso concedido para {}", claims.username);
        Ok(next.run(request).await)
    } else {
        tracing::warn!("Admin MW: acesso negado para {} (não é superusuário).", claims.username);
        Err(AppError::Forbidden)
    }
}
