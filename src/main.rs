// src/main.rs

// --- Declaração dos Módulos ---
mod config;
mod db;
mod error;
mod models;
mod services;
mod state;
mod web;

// --- Imports ---
use crate::{config::Config, models::usuario::NovoUsuario, services::usuario_service, state::AppState};
use axum::serve;
use sqlx::SqlitePool;
use std::env;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Configuração do Logging (Tracing) ---
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "igreja_api=debug,tower_http=info,sqlx=warn".into()),
        )
        .with(fmt::layer())
        .init();

    let config = Config::from_env()?;

    // --- Configuração da Base de Dados ---
    let db_pool = match db::create_db_pool(&config.database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Falha crítica ao inicializar a base de dados: {}", e);
            return Err(anyhow::anyhow!("Falha ao conectar/migrar DB: {}", e));
        }
    };

    // --- Comandos de linha (seed) ---
    let args: Vec<String> = env::args().skip(1).collect();
    if !args.is_empty() {
        return executar_comando(&db_pool, &config, &args).await;
    }

    tracing::info!("🚀 Iniciando API da Igreja...");

    // --- Criação do Estado da Aplicação ---
    let app_state = AppState::new(db_pool, &config);

    // --- Configuração do Endereço e Listener ---
    let addr = config.bind_addr;
    tracing::info!("📡 Servidor escutando em http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ Falha ao iniciar listener em {}: {}", addr, e);
            return Err(e.into());
        }
    };

    // --- Criação do Router e Aplicação das Camadas (Middlewares) ---
    tracing::info!("🛠️ Construindo router e aplicando middlewares...");
    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            // O frontend corre noutra origem
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );
    tracing::info!("✅ Router e middlewares configurados.");

    // --- Início do Servidor ---
    tracing::info!("👂 Servidor pronto para aceitar conexões...");
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Erro fatal no servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}

async fn executar_comando(db_pool: &SqlitePool, config: &Config, args: &[String]) -> anyhow::Result<()> {
    match args[0].as_str() {
        "criar-usuarios" => {
            let resultado = usuario_service::criar_usuarios_demo(db_pool, config.bcrypt_cost).await?;
            for (username, criado) in resultado {
                if criado {
                    println!("Usuário {} criado com sucesso!", username);
                } else {
                    println!("Usuário {} já existe.", username);
                }
            }
            Ok(())
        }
        "criar-superusuario" => {
            let (Some(username), Some(password)) = (args.get(1), args.get(2)) else {
                anyhow::bail!("Uso: criar-superusuario <username> <password> [email]");
            };
            let usuario = usuario_service::create_usuario(
                db_pool,
                NovoUsuario {
                    username: username.clone(),
                    password: password.clone(),
                    email: args.get(3).cloned(),
                    genero: None,
                    idade: None,
                    is_active: Some(true),
                    is_superuser: Some(true),
                },
                config.bcrypt_cost,
            )
            .await?;
            println!("Superusuário {} criado (id {}).", usuario.username, usuario.id);
            Ok(())
        }
        outro => anyhow::bail!(
            "Comando desconhecido: {}. Comandos: criar-usuarios, criar-superusuario",
            outro
        ),
    }
}
