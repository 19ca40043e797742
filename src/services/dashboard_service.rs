// src/services/dashboard_service.rs
use crate::{
    config::DashboardConfig,
    error::AppResult,
    models::{
        dashboard::{
            ContagemGenero, ContagemMinisterio, Dashboard, FaixaEtaria, Histograma, MembroStats,
            UsuarioStats,
        },
        genero::rotulo_genero,
    },
    services::agora,
};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::{SqliteConnection, SqlitePool};

const TOP_MINISTERIOS: i64 = 10;

/// Calcula o dashboard completo num único snapshot de leitura.
pub async fn gerar_dashboard(db_pool: &SqlitePool, config: &DashboardConfig) -> AppResult<Dashboard> {
    gerar_dashboard_em(db_pool, config, agora()).await
}

/// Como `gerar_dashboard`, mas com o instante de avaliação explícito.
pub async fn gerar_dashboard_em(
    db_pool: &SqlitePool,
    config: &DashboardConfig,
    instante: DateTime<Utc>,
) -> AppResult<Dashboard> {
    tracing::debug!("Calculando dashboard em {}", instante);
    // Transação só de leitura: todas as contagens veem o mesmo estado
    let mut tx = db_pool.begin().await?;
    let usuarios = calcular_estatisticas_usuarios(&mut *tx, &config.faixas_usuarios).await?;
    let membros = calcular_estatisticas_membros(
        &mut *tx,
        &config.faixas_membros,
        instante,
        config.janela_recentes_dias,
    )
    .await?;
    tx.commit().await?;

    tracing::debug!(
        "Dashboard: {} usuários, {} membros ({} recentes)",
        usuarios.total,
        membros.total,
        membros.recentes_30_dias
    );
    Ok(Dashboard::new(usuarios, membros))
}

pub async fn calcular_estatisticas_usuarios(
    conn: &mut SqliteConnection,
    faixas: &[FaixaEtaria],
) -> AppResult<UsuarioStats> {
    let (total, ativos): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COALESCE(SUM(is_active), 0) FROM usuarios")
            .fetch_one(&mut *conn)
            .await?;

    let por_genero = contar_por_genero(conn, "usuarios").await?;
    let por_faixa_etaria = histograma_por_idade(conn, "usuarios", faixas).await?;

    Ok(UsuarioStats {
        total,
        ativos,
        inativos: total - ativos,
        por_genero,
        por_faixa_etaria,
    })
}

pub async fn calcular_estatisticas_membros(
    conn: &mut SqliteConnection,
    faixas: &[FaixaEtaria],
    instante: DateTime<Utc>,
    janela_dias: i64,
) -> AppResult<MembroStats> {
    let (total, ativos, batizados): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(ativo), 0), COALESCE(SUM(batizado), 0) FROM membros",
    )
    .fetch_one(&mut *conn)
    .await?;

    let limite = (instante - Duration::days(janela_dias)).trunc_subsecs(3);
    let recentes_30_dias: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM membros WHERE criado_em >= ?1")
            .bind(limite)
            .fetch_one(&mut *conn)
            .await?;

    let por_genero = contar_por_genero(conn, "membros").await?;
    let por_faixa_etaria = histograma_por_idade(conn, "membros", faixas).await?;

    let por_ministerio = sqlx::query_as::<_, ContagemMinisterio>(
        r#"
        SELECT ministerio, COUNT(*) AS total
        FROM membros
        WHERE ministerio IS NOT NULL AND TRIM(ministerio) <> ''
        GROUP BY ministerio
        ORDER BY total DESC, ministerio ASC
        LIMIT ?1
        "#,
    )
    .bind(TOP_MINISTERIOS)
    .fetch_all(&mut *conn)
    .await?;

    Ok(MembroStats {
        total,
        ativos,
        inativos: total - ativos,
        batizados,
        recentes_30_dias,
        por_genero,
        por_faixa_etaria,
        por_ministerio,
    })
}

// `tabela` é sempre uma constante interna ("usuarios" ou "membros").
async fn contar_por_genero(
    conn: &mut SqliteConnection,
    tabela: &str,
) -> AppResult<Vec<ContagemGenero>> {
    let linhas: Vec<(String, i64)> = sqlx::query_as(&format!(
        "SELECT genero, COUNT(*) FROM {} GROUP BY genero ORDER BY genero ASC",
        tabela
    ))
    .fetch_all(&mut *conn)
    .await?;

    Ok(linhas
        .into_iter()
        .map(|(codigo, total)| ContagemGenero {
            genero: rotulo_genero(&codigo),
            codigo,
            total,
        })
        .collect())
}

async fn histograma_por_idade(
    conn: &mut SqliteConnection,
    tabela: &str,
    faixas: &[FaixaEtaria],
) -> AppResult<Histograma> {
    let contagens: Vec<(i64, i64)> = sqlx::query_as(&format!(
        "SELECT idade, COUNT(*) FROM {} WHERE idade IS NOT NULL GROUP BY idade",
        tabela
    ))
    .fetch_all(&mut *conn)
    .await?;
    Ok(Histograma::distribuir(faixas, &contagens))
}
