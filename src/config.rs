// src/config.rs
use crate::{
    error::{AppError, AppResult},
    models::dashboard::{faixas_padrao, FaixaEtaria},
};
use std::{env, net::SocketAddr};

const BIND_ADDR_PADRAO: &str = "0.0.0.0:3000";

// Limites aceites pelo bcrypt (a crate não os exporta)
pub const BCRYPT_MIN_COST: u32 = 4;
pub const BCRYPT_MAX_COST: u32 = 31;

/// Configuração do dashboard. As faixas de usuários e de membros são
/// independentes.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub faixas_usuarios: Vec<FaixaEtaria>,
    pub faixas_membros: Vec<FaixaEtaria>,
    pub janela_recentes_dias: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            faixas_usuarios: faixas_padrao(),
            faixas_membros: faixas_padrao(),
            janela_recentes_dias: 30,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub bcrypt_cost: u32,
    pub dashboard: DashboardConfig,
}

impl Config {
    /// Lê a configuração das variáveis de ambiente (o `.env` já deve ter
    /// sido carregado por `dotenvy`).
    pub fn from_env() -> AppResult<Self> {
        let database_url = env_string("DATABASE_URL")
            .ok_or_else(|| AppError::Config("DATABASE_URL não definida".into()))?;

        let jwt_secret = env_string("JWT_SECRET")
            .ok_or_else(|| AppError::Config("JWT_SECRET não definida".into()))?;
        if jwt_secret.len() < 32 {
            tracing::warn!("⚠️ JWT_SECRET é curta, considere usar uma chave mais longa e aleatória!");
        }

        let bind_addr = env_string("BIND_ADDR")
            .unwrap_or_else(|| BIND_ADDR_PADRAO.into())
            .parse::<SocketAddr>()
            .map_err(|e| AppError::Config(format!("BIND_ADDR inválido: {}", e)))?;

        let access_token_minutes = env_parse("ACCESS_TOKEN_MINUTES")?.unwrap_or(5);
        let refresh_token_days = env_parse("REFRESH_TOKEN_DAYS")?.unwrap_or(1);
        if access_token_minutes <= 0 || refresh_token_days <= 0 {
            return Err(AppError::Config(
                "a validade dos tokens tem de ser positiva".into(),
            ));
        }

        let bcrypt_cost = validar_custo_bcrypt(
            env_parse("BCRYPT_COST")?.unwrap_or(bcrypt::DEFAULT_COST),
        )?;

        let mut dashboard = DashboardConfig::default();
        if let Some(faixas) = env_faixas("FAIXAS_ETARIAS_USUARIOS")? {
            dashboard.faixas_usuarios = faixas;
        }
        if let Some(faixas) = env_faixas("FAIXAS_ETARIAS_MEMBROS")? {
            dashboard.faixas_membros = faixas;
        }

        Ok(Self {
            database_url,
            bind_addr,
            jwt_secret,
            access_token_minutes,
            refresh_token_days,
            bcrypt_cost,
            dashboard,
        })
    }
}

fn validar_custo_bcrypt(custo: u32) -> AppResult<u32> {
    if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&custo) {
        return Err(AppError::Config(format!(
            "BCRYPT_COST fora do intervalo {}..={}",
            BCRYPT_MIN_COST, BCRYPT_MAX_COST
        )));
    }
    Ok(custo)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str) -> AppResult<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    env_string(key)
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| AppError::Config(format!("{} inválido: {}", key, e)))
        })
        .transpose()
}

fn env_faixas(key: &str) -> AppResult<Option<Vec<FaixaEtaria>>> {
    env_string(key)
        .map(|v| {
            FaixaEtaria::parse_lista(&v)
                .map_err(|e| AppError::Config(format!("{}: {}", key, e)))
        })
        .transpose()
}
