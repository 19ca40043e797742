// src/error.rs
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::collections::BTreeMap;
use thiserror::Error;
use validator::ValidationErrors;

/// Erros de validação por campo, no formato `{"campo": ["mensagem", ...]}`.
pub type ErrosDeCampo = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Erro na base de dados: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Erro de migração da base de dados: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro ao processar password")]
    PasswordHashingError,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido: {0}")]
    Token(String),

    #[error("Dados inválidos: {0:?}")]
    Validacao(ErrosDeCampo),

    #[error("Recurso não encontrado")]
    NotFound,

    #[error("Sem permissão")]
    Forbidden,

    #[error("Erro interno inesperado")]
    InternalServerError,

    #[error("Não autorizado")]
    Unauthorized,
}

impl AppError {
    /// Atalho para um erro de validação num único campo.
    pub fn campo(campo: &str, mensagem: impl Into<String>) -> Self {
        let mut erros = ErrosDeCampo::new();
        erros.insert(campo.to_string(), vec![mensagem.into()]);
        AppError::Validacao(erros)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validacao(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::Token(_) | AppError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::campo("non_field_errors", rejection.body_text())
    }
}

// Parâmetros de rota só existem como `{id}`
impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::campo("id", rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::campo("non_field_errors", rejection.body_text())
    }
}

impl From<ValidationErrors> for AppError {
    fn from(erros: ValidationErrors) -> Self {
        AppError::Validacao(erros_de_campo(&erros))
    }
}

/// Converte os erros do `validator` para o mapa campo → mensagens.
pub fn erros_de_campo(erros: &ValidationErrors) -> ErrosDeCampo {
    let mut mapa = ErrosDeCampo::new();
    for (campo, lista) in erros.field_errors() {
        let mensagens = mapa.entry(campo.to_string()).or_default();
        for erro in lista.iter() {
            mensagens.push(
                erro.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| erro.code.to_string()),
            );
        }
    }
    mapa
}

// Como converter AppError numa resposta HTTP (JSON)
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Erro processado: {:?}", self);
        } else {
            tracing::warn!("Pedido rejeitado ({}): {}", status.as_u16(), self);
        }

        let body = match self {
            AppError::Validacao(erros) => json!(erros),
            AppError::InvalidCredentials => {
                json!({ "detail": "No active account found with the given credentials" })
            }
            AppError::Token(_) => json!({
                "detail": "Given token not valid for any token type",
                "code": "token_not_valid",
            }),
            AppError::Unauthorized => {
                json!({ "detail": "Authentication credentials were not provided." })
            }
            AppError::Forbidden => {
                json!({ "detail": "You do not have permission to perform this action." })
            }
            AppError::NotFound => json!({ "detail": "Não encontrado." }),
            AppError::SqlxError(_) | AppError::SqlxMigrateError(_) => {
                json!({ "detail": "Erro ao aceder aos dados." })
            }
            AppError::Config(_) => json!({ "detail": "Erro de configuração." }),
            AppError::PasswordHashingError => {
                json!({ "detail": "Erro ao processar credenciais." })
            }
            AppError::InternalServerError => json!({ "detail": "Ocorreu um erro inesperado." }),
        };

        (status, Json(body)).into_response()
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;
