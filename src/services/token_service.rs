// src/services/token_service.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::Usuario,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

pub const TIPO_ACCESS: &str = "access";
pub const TIPO_REFRESH: &str = "refresh";

/// Claims transportadas por access e refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub username: String,
    pub is_superuser: bool,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPar {
    pub access: String,
    pub refresh: String,
}

/// Emite e valida tokens HS256. A validação usa apenas a chave local.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn emitir_par(&self, usuario: &Usuario) -> AppResult<TokenPar> {
        Ok(TokenPar {
            access: self.emitir(usuario.id, &usuario.username, usuario.is_superuser, TIPO_ACCESS)?,
            refresh: self.emitir(usuario.id, &usuario.username, usuario.is_superuser, TIPO_REFRESH)?,
        })
    }

    /// Novo access token a partir de um refresh token válido.
    pub fn renovar_access(&self, refresh: &str) -> AppResult<String> {
        let claims = self.validar(refresh, TIPO_REFRESH)?;
        self.emitir(claims.user_id, &claims.username, claims.is_superuser, TIPO_ACCESS)
    }

    pub fn validar_access(&self, token: &str) -> AppResult<Claims> {
        self.validar(token, TIPO_ACCESS)
    }

    fn emitir(
        &self,
        user_id: i64,
        username: &str,
        is_superuser: bool,
        token_type: &str,
    ) -> AppResult<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = if token_type == TIPO_REFRESH {
            self.refresh_ttl
        } else {
            self.access_ttl
        };
        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            username: username.to_string(),
            is_superuser,
            token_type: token_type.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + ttl).unix_timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Falha ao assinar token: {}", e);
            AppError::InternalServerError
        })
    }

    fn validar(&self, token: &str, tipo: &str) -> AppResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| AppError::Token(e.to_string()))?
            .claims;
        if claims.token_type != tipo {
            return Err(AppError::Token(format!(
                "esperado token '{}', recebido '{}'",
                tipo, claims.token_type
            )));
        }
        Ok(claims)
    }
}
