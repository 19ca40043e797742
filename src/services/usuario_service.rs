// src/services/usuario_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        genero::normalizar_genero,
        usuario::{NovoUsuario, Usuario, UsuarioPatch},
    },
    services::{agora, auth_service, violacao_unica},
};
use sqlx::SqlitePool;
use validator::Validate;

const SELECT_USUARIO: &str = r#"
    SELECT id, username, email, password_hash, genero, idade, is_active, is_superuser, criado_em
    FROM usuarios
"#;

/// Contas criadas pelo comando `criar-usuarios`.
pub const USUARIOS_DEMO: &[(&str, &str, &str, i64, bool)] = &[
    ("joao", "joao@email.com", "M", 22, true),
    ("maria", "maria@email.com", "F", 30, true),
    ("carlos", "carlos@email.com", "M", 45, false),
    ("ana", "ana@email.com", "F", 18, true),
    ("patricia", "patricia@email.com", "O", 27, true),
];
pub const SENHA_DEMO: &str = "senha123";

pub async fn find_usuario_by_id(db_pool: &SqlitePool, id: i64) -> AppResult<Option<Usuario>> {
    tracing::debug!("Buscando usuário por ID: {}", id);
    let usuario = sqlx::query_as::<_, Usuario>(&format!("{} WHERE id = ?1", SELECT_USUARIO))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(usuario)
}

pub async fn find_usuario_by_username(
    db_pool: &SqlitePool,
    username: &str,
) -> AppResult<Option<Usuario>> {
    tracing::debug!("Buscando usuário por username: {}", username);
    let usuario = sqlx::query_as::<_, Usuario>(&format!("{} WHERE username = ?1", SELECT_USUARIO))
        .bind(username)
        .fetch_optional(db_pool)
        .await?;
    Ok(usuario)
}

pub async fn find_all_usuarios(db_pool: &SqlitePool) -> AppResult<Vec<Usuario>> {
    let usuarios = sqlx::query_as::<_, Usuario>(&format!("{} ORDER BY username ASC", SELECT_USUARIO))
        .fetch_all(db_pool)
        .await?;
    tracing::debug!("Encontrados {} usuários.", usuarios.len());
    Ok(usuarios)
}

// PATCH: `idade` pode vir como null, valida-se o valor final
fn validar_idade(idade: Option<i64>) -> AppResult<()> {
    if idade.is_some_and(|i| i < 0) {
        return Err(AppError::campo(
            "idade",
            "Certifique-se de que este valor seja maior ou igual a 0.",
        ));
    }
    Ok(())
}

pub async fn create_usuario(
    db_pool: &SqlitePool,
    novo: NovoUsuario,
    bcrypt_cost: u32,
) -> AppResult<Usuario> {
    let novo = novo.normalizado();
    let username = novo.username.clone();
    tracing::info!("Tentando criar usuário: {}", username);

    // Tamanhos, email e idade
    novo.validate()?;
    let genero = normalizar_genero(novo.genero.as_deref()).map_err(|m| AppError::campo("genero", m))?;

    let password_hash = auth_service::hash_password(&novo.password, bcrypt_cost).await?;

    let resultado = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO usuarios (username, email, password_hash, genero, idade, is_active, is_superuser, criado_em)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        RETURNING id
        "#,
    )
    .bind(&username)
    .bind(novo.email.as_deref().unwrap_or(""))
    .bind(&password_hash)
    .bind(&genero)
    .bind(novo.idade)
    .bind(novo.is_active.unwrap_or(true))
    .bind(novo.is_superuser.unwrap_or(false))
    .bind(agora())
    .fetch_one(db_pool)
    .await;

    let id = match resultado {
        Ok(id) => id,
        Err(e) if violacao_unica(&e) => {
            tracing::warn!("Falha ao criar usuário: '{}' já existe.", username);
            return Err(AppError::campo(
                "username",
                "Um usuário com este nome de usuário já existe.",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!("✅ Usuário '{}' criado com sucesso (id {}).", username, id);
    find_usuario_by_id(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

pub async fn update_usuario(
    db_pool: &SqlitePool,
    id: i64,
    patch: UsuarioPatch,
    bcrypt_cost: u32,
) -> AppResult<Usuario> {
    tracing::info!("Atualizando usuário: {}", id);
    let atual = find_usuario_by_id(db_pool, id).await?.ok_or(AppError::NotFound)?;
    let patch = patch.normalizado();
    patch.validate()?;

    let genero = match patch.genero.as_deref() {
        Some(g) => normalizar_genero(Some(g)).map_err(|m| AppError::campo("genero", m))?,
        None => atual.genero.clone(),
    };
    let idade = patch.idade.unwrap_or(atual.idade);
    validar_idade(idade)?;

    let password_hash = match patch.password.as_deref() {
        Some(p) => auth_service::hash_password(p, bcrypt_cost).await?,
        None => atual.password_hash.clone(),
    };

    sqlx::query(
        r#"
        UPDATE usuarios
        SET email = ?1, genero = ?2, idade = ?3, is_active = ?4, is_superuser = ?5, password_hash = ?6
        WHERE id = ?7
        "#,
    )
    .bind(patch.email.as_deref().unwrap_or(atual.email.as_str()))
    .bind(&genero)
    .bind(idade)
    .bind(patch.is_active.unwrap_or(atual.is_active))
    .bind(patch.is_superuser.unwrap_or(atual.is_superuser))
    .bind(&password_hash)
    .bind(id)
    .execute(db_pool)
    .await?;

    tracing::info!("✅ Usuário {} atualizado.", id);
    find_usuario_by_id(db_pool, id).await?.ok_or(AppError::NotFound)
}

/// Apaga a conta. Os membros que a referenciam ficam com
/// `usuario_responsavel = NULL` (ON DELETE SET NULL).
pub async fn delete_usuario(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    tracing::info!("Apagando usuário: {}", id);
    let rows_affected = sqlx::query("DELETE FROM usuarios WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao apagar: usuário {} não encontrado.", id);
        return Err(AppError::NotFound);
    }
    tracing::info!("✅ Usuário {} apagado.", id);
    Ok(())
}

/// Cria as contas de demonstração que ainda não existem. Devolve
/// `(username, criado)` para cada conta.
pub async fn criar_usuarios_demo(
    db_pool: &SqlitePool,
    bcrypt_cost: u32,
) -> AppResult<Vec<(String, bool)>> {
    let mut resultado = Vec::with_capacity(USUARIOS_DEMO.len());
    for (username, email, genero, idade, ativo) in USUARIOS_DEMO {
        if find_usuario_by_username(db_pool, username).await?.is_some() {
            tracing::info!("Usuário {} já existe.", username);
            resultado.push((username.to_string(), false));
            continue;
        }
        create_usuario(
            db_pool,
            NovoUsuario {
                username: username.to_string(),
                password: SENHA_DEMO.to_string(),
                email: Some(email.to_string()),
                genero: Some(genero.to_string()),
                idade: Some(*idade),
                is_active: Some(*ativo),
                is_superuser: Some(false),
            },
            bcrypt_cost,
        )
        .await?;
        resultado.push((username.to_string(), true));
    }
    Ok(resultado)
}
