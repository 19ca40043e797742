// src/models/usuario.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidateEmail, ValidationError};

use super::anulavel;

// Representa uma conta lida da tabela 'usuarios'
#[derive(Debug, Clone, FromRow)]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub genero: String, // "M", "F", "O" ou "N"
    pub idade: Option<i64>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub criado_em: DateTime<Utc>,
}

/// Perfil devolvido por `/me/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsuarioPerfil {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_superuser: bool,
}

impl From<&Usuario> for UsuarioPerfil {
    fn from(u: &Usuario) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            email: u.email.clone(),
            is_superuser: u.is_superuser,
        }
    }
}

/// Resumo ecoado na resposta de login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsuarioResumo {
    pub id: i64,
    pub username: String,
    pub is_superuser: bool,
}

impl From<&Usuario> for UsuarioResumo {
    fn from(u: &Usuario) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            is_superuser: u.is_superuser,
        }
    }
}

/// Vista completa (sem hash) para a administração de contas.
#[derive(Debug, Clone, Serialize)]
pub struct UsuarioDetalhe {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub genero: String,
    pub idade: Option<i64>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub criado_em: DateTime<Utc>,
}

impl From<Usuario> for UsuarioDetalhe {
    fn from(u: Usuario) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
            genero: u.genero,
            idade: u.idade,
            is_active: u.is_active,
            is_superuser: u.is_superuser,
            criado_em: u.criado_em,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshPayload {
    pub refresh: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NovoUsuario {
    #[validate(length(min = 1, max = 150, message = "Informe um username com 1 a 150 caracteres."))]
    pub username: String,
    #[validate(length(min = 8, message = "A senha deve ter pelo menos 8 caracteres."))]
    pub password: String,
    #[serde(default)]
    #[validate(custom(function = "email_ou_vazio"))]
    pub email: Option<String>,
    #[serde(default)]
    pub genero: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "Certifique-se de que este valor seja maior ou igual a 0."))]
    pub idade: Option<i64>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl NovoUsuario {
    /// Remove espaços à volta do username e do email.
    pub fn normalizado(mut self) -> Self {
        self.username = self.username.trim().to_string();
        self.email = self.email.map(|e| e.trim().to_string());
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UsuarioPatch {
    #[validate(custom(function = "email_ou_vazio"))]
    pub email: Option<String>,
    pub genero: Option<String>,
    #[serde(default, deserialize_with = "anulavel")]
    pub idade: Option<Option<i64>>,
    pub is_active: Option<bool>,
    pub is_superuser: Option<bool>,
    #[validate(length(min = 8, message = "A senha deve ter pelo menos 8 caracteres."))]
    pub password: Option<String>,
}

impl UsuarioPatch {
    pub fn normalizado(mut self) -> Self {
        self.email = self.email.map(|e| e.trim().to_string());
        self
    }
}

// Contas podem ficar sem email
fn email_ou_vazio(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email").with_message("Insira um endereço de email válido.".into()))
    }
}
