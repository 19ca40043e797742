// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::usuario::Usuario,
    services::usuario_service,
};
use sqlx::SqlitePool;

/// Verifica se a senha fornecida corresponde ao hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao verificar senha: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Gera um hash bcrypt para uma senha.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Gerando hash bcrypt (custo {})...", cost);
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Erro na task spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Erro bcrypt ao gerar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Valida username e senha. Conta inexistente, senha errada e conta inativa
/// devolvem todas `InvalidCredentials`.
pub async fn autenticar(
    db_pool: &SqlitePool,
    username: &str,
    password: &str,
    bcrypt_cost: u32,
) -> AppResult<Usuario> {
    tracing::info!("Tentativa de login para: {}", username);

    let Some(usuario) = usuario_service::find_usuario_by_username(db_pool, username).await? else {
        // Mesmo custo de CPU que uma verificação real
        hash_password(password, bcrypt_cost).await?;
        tracing::warn!("Login falhou: utilizador '{}' não encontrado.", username);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(password, &usuario.password_hash).await? {
        tracing::warn!("Login falhou: senha incorreta para '{}'.", username);
        return Err(AppError::InvalidCredentials);
    }

    if !usuario.is_active {
        tracing::warn!("Login falhou: conta '{}' inativa.", username);
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!("✅ Login bem-sucedido para: {}", usuario.username);
    Ok(usuario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::pool_de_teste, models::usuario::NovoUsuario};

    fn novo(username: &str, ativo: bool) -> NovoUsuario {
        NovoUsuario {
            username: username.into(),
            password: "senha123".into(),
            email: None,
            genero: None,
            idade: None,
            is_active: Some(ativo),
            is_superuser: None,
        }
    }

    #[tokio::test]
    async fn hash_e_verificacao() {
        let hash = hash_password("segredo", crate::config::BCRYPT_MIN_COST).await.unwrap();
        assert!(verify_password("segredo", &hash).await.unwrap());
        assert!(!verify_password("outro", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn autenticar_aceita_conta_ativa() {
        let pool = pool_de_teste().await;
        usuario_service::create_usuario(&pool, novo("maria", true), crate::config::BCRYPT_MIN_COST)
            .await
            .unwrap();
        let u = autenticar(&pool, "maria", "senha123", crate::config::BCRYPT_MIN_COST)
            .await
            .unwrap();
        assert_eq!(u.username, "maria");
    }

    #[tokio::test]
    async fn autenticar_nao_distingue_motivos_de_falha() {
        let pool = pool_de_teste().await;
        usuario_service::create_usuario(&pool, novo("maria", true), crate::config::BCRYPT_MIN_COST)
            .await
            .unwrap();
        usuario_service::create_usuario(&pool, novo("carlos", false), crate::config::BCRYPT_MIN_COST)
            .await
            .unwrap();

        for (username, senha) in [("maria", "errada"), ("ninguem", "senha123"), ("carlos", "senha123")] {
            let err = autenticar(&pool, username, senha, crate::config::BCRYPT_MIN_COST)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials), "{username}");
        }
    }
}
