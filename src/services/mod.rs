// src/services/mod.rs
pub mod auth_service;
pub mod dashboard_service;
pub mod membro_service;
pub mod token_service;
pub mod usuario_service;

use chrono::{DateTime, SubsecRound, Utc};

/// Instante atual truncado ao milissegundo, formato usado nas colunas de data/hora.
pub fn agora() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// O erro é uma violação de UNIQUE?
pub(crate) fn violacao_unica(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// O erro é uma violação de chave estrangeira?
pub(crate) fn violacao_chave_estrangeira(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}
