// src/services/membro_service.rs
use crate::{
    error::{AppError, AppResult},
    models::membro::{DadosMembro, Membro, MembroPatch, MembroPayload},
    services::{agora, violacao_chave_estrangeira, violacao_unica},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

const SELECT_MEMBRO: &str = r#"
    SELECT id, usuario_responsavel, nome_completo, cpf, rg, data_nascimento, endereco,
           telefone, email, batizado, data_batismo, ministerio, ativo, criado_em,
           atualizado_em, genero, idade
    FROM membros
"#;

// Listagem: mais recentes primeiro, id como desempate
const ORDEM_LISTAGEM: &str = "ORDER BY criado_em DESC, id DESC";

pub const PAGE_SIZE_PADRAO: i64 = 20;
pub const PAGE_SIZE_MAX: i64 = 100;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paginacao {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginaMembros {
    pub count: i64,
    pub page: i64,
    pub page_size: i64,
    pub results: Vec<Membro>,
}

fn mapear_erro_escrita(e: sqlx::Error) -> AppError {
    if violacao_unica(&e) {
        tracing::warn!("Escrita de membro rejeitada: CPF duplicado.");
        AppError::campo("cpf", "membro com este cpf já existe.")
    } else if violacao_chave_estrangeira(&e) {
        tracing::warn!("Escrita de membro rejeitada: usuário responsável inexistente.");
        AppError::campo("usuario_responsavel", "Usuário responsável não encontrado.")
    } else {
        e.into()
    }
}

pub async fn listar_membros(db_pool: &SqlitePool) -> AppResult<Vec<Membro>> {
    let membros = sqlx::query_as::<_, Membro>(&format!("{} {}", SELECT_MEMBRO, ORDEM_LISTAGEM))
        .fetch_all(db_pool)
        .await?;
    tracing::debug!("Encontrados {} membros.", membros.len());
    Ok(membros)
}

pub async fn listar_membros_paginado(
    db_pool: &SqlitePool,
    paginacao: Paginacao,
) -> AppResult<PaginaMembros> {
    let page = paginacao.page.unwrap_or(1);
    if page < 1 {
        return Err(AppError::campo("page", "Página inválida."));
    }
    let page_size = paginacao
        .page_size
        .unwrap_or(PAGE_SIZE_PADRAO)
        .clamp(1, PAGE_SIZE_MAX);

    // Páginas absurdas (?page=9223372036854775807) não podem estourar o OFFSET
    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| AppError::campo("page", "Página inválida."))?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM membros")
        .fetch_one(db_pool)
        .await?;
    let results = sqlx::query_as::<_, Membro>(&format!(
        "{} {} LIMIT ?1 OFFSET ?2",
        SELECT_MEMBRO, ORDEM_LISTAGEM
    ))
    .bind(page_size)
    .bind(offset)
    .fetch_all(db_pool)
    .await?;

    Ok(PaginaMembros {
        count,
        page,
        page_size,
        results,
    })
}

pub async fn buscar_membro(db_pool: &SqlitePool, id: i64) -> AppResult<Option<Membro>> {
    tracing::debug!("Buscando membro por ID: {}", id);
    let membro = sqlx::query_as::<_, Membro>(&format!("{} WHERE id = ?1", SELECT_MEMBRO))
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
    Ok(membro)
}

pub async fn criar_membro(db_pool: &SqlitePool, payload: MembroPayload) -> AppResult<Membro> {
    let agora = agora();
    // Validação completa antes de tocar na DB
    let dados = payload.validar(agora.date_naive())?;
    tracing::info!("Criando membro '{}' (cpf {})", dados.nome_completo, dados.cpf);

    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO membros (
            usuario_responsavel, nome_completo, cpf, rg, data_nascimento, endereco, telefone,
            email, batizado, data_batismo, ministerio, ativo, genero, idade, criado_em, atualizado_em
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)
        RETURNING id
        "#,
    )
    .bind(dados.usuario_responsavel)
    .bind(&dados.nome_completo)
    .bind(&dados.cpf)
    .bind(&dados.rg)
    .bind(dados.data_nascimento)
    .bind(&dados.endereco)
    .bind(&dados.telefone)
    .bind(&dados.email)
    .bind(dados.batizado)
    .bind(dados.data_batismo)
    .bind(&dados.ministerio)
    .bind(dados.ativo)
    .bind(&dados.genero)
    .bind(dados.idade)
    .bind(agora)
    .fetch_one(db_pool)
    .await
    // CPF duplicado ou responsável inexistente viram erros de campo
    .map_err(mapear_erro_escrita)?;

    tracing::info!("✅ Membro {} criado.", id);
    buscar_membro(db_pool, id)
        .await?
        .ok_or(AppError::InternalServerError)
}

/// PUT: substitui todos os campos editáveis. `criado_em` nunca é tocado.
pub async fn atualizar_membro(
    db_pool: &SqlitePool,
    id: i64,
    payload: MembroPayload,
) -> AppResult<Membro> {
    let agora = agora();
    let dados = payload.validar(agora.date_naive())?;
    gravar(db_pool, id, &dados, agora).await
}

/// PATCH: junta os campos enviados ao registo atual e valida o resultado.
pub async fn atualizar_membro_parcial(
    db_pool: &SqlitePool,
    id: i64,
    patch: MembroPatch,
) -> AppResult<Membro> {
    let atual = buscar_membro(db_pool, id).await?.ok_or(AppError::NotFound)?;
    let agora = agora();
    let dados = atual.aplicar_patch(patch).validar(agora.date_naive())?;
    gravar(db_pool, id, &dados, agora).await
}

async fn gravar(
    db_pool: &SqlitePool,
    id: i64,
    dados: &DadosMembro,
    agora: chrono::DateTime<chrono::Utc>,
) -> AppResult<Membro> {
    tracing::info!("Atualizando membro {}", id);
    let rows_affected = sqlx::query(
        r#"
        UPDATE membros
        SET usuario_responsavel = ?1, nome_completo = ?2, cpf = ?3, rg = ?4, data_nascimento = ?5,
            endereco = ?6, telefone = ?7, email = ?8, batizado = ?9, data_batismo = ?10,
            ministerio = ?11, ativo = ?12, genero = ?13, idade = ?14, atualizado_em = ?15
        WHERE id = ?16
        "#,
    )
    .bind(dados.usuario_responsavel)
    .bind(&dados.nome_completo)
    .bind(&dados.cpf)
    .bind(&dados.rg)
    .bind(dados.data_nascimento)
    .bind(&dados.endereco)
    .bind(&dados.telefone)
    .bind(&dados.email)
    .bind(dados.batizado)
    .bind(dados.data_batismo)
    .bind(&dados.ministerio)
    .bind(dados.ativo)
    .bind(&dados.genero)
    .bind(dados.idade)
    .bind(agora)
    .bind(id)
    .execute(db_pool)
    .await
    .map_err(mapear_erro_escrita)?
    .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao atualizar: membro {} não encontrado.", id);
        return Err(AppError::NotFound);
    }
    tracing::info!("✅ Membro {} atualizado.", id);
    buscar_membro(db_pool, id).await?.ok_or(AppError::NotFound)
}

pub async fn remover_membro(db_pool: &SqlitePool, id: i64) -> AppResult<()> {
    tracing::info!("Removendo membro {}", id);
    let rows_affected = sqlx::query("DELETE FROM membros WHERE id = ?1")
        .bind(id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("Falha ao remover: membro {} não encontrado.", id);
        return Err(AppError::NotFound);
    }
    tracing::info!("✅ Membro {} removido.", id);
    Ok(())
}
