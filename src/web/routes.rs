// src/web/routes.rs
use crate::{
    state::AppState,
    web::{auth_handlers, dashboard_handlers, membro_handlers, mw_admin, mw_auth, usuario_handlers},
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Rotas Públicas ---
    let public_routes = Router::new()
        .route("/token/", post(auth_handlers::obter_token))
        .route("/token/refresh/", post(auth_handlers::renovar_token))
        .route("/test/", get(dashboard_handlers::test_conexao));

    // --- Rotas de Admin ---
    // Exigem token E is_superuser (require_auth é aplicado no router pai)
    let admin_routes = Router::new()
        .route(
            "/usuarios/",
            get(usuario_handlers::listar).post(usuario_handlers::criar),
        )
        .route(
            "/usuarios/{id}/",
            patch(usuario_handlers::atualizar).delete(usuario_handlers::remover),
        )
        .route_layer(middleware::from_fn(mw_admin::require_superuser));

    // --- Rotas Autenticadas ---
    let authenticated_routes = Router::new()
        .route("/me/", get(auth_handlers::me))
        .route("/dashboard/", get(dashboard_handlers::dashboard))
        .route(
            "/membros/",
            get(membro_handlers::listar).post(membro_handlers::criar),
        )
        .route(
            "/membros/{id}/",
            get(membro_handlers::detalhe)
                .put(membro_handlers::atualizar)
                .patch(membro_handlers::atualizar_parcial)
                .delete(membro_handlers::remover),
        )
        .merge(admin_routes)
        // Token obrigatório em TODAS as rotas acima, incluindo as de admin
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    // --- Router Final ---
    Router::new()
        .route("/", get(dashboard_handlers::home))
        .nest("/api", public_routes.merge(authenticated_routes))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{Config, DashboardConfig},
        db::pool_de_teste,
        models::usuario::NovoUsuario,
        services::usuario_service,
    };
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    fn config() -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            jwt_secret: "segredo-de-teste-com-tamanho-suficiente".into(),
            access_token_minutes: 5,
            refresh_token_days: 1,
            bcrypt_cost: crate::config::BCRYPT_MIN_COST,
            dashboard: DashboardConfig::default(),
        }
    }

    async fn app() -> (Router, SqlitePool) {
        let pool = pool_de_teste().await;
        for (username, superuser) in [("admin", true), ("joao", false)] {
            usuario_service::create_usuario(
                &pool,
                NovoUsuario {
                    username: username.into(),
                    password: "senha123".into(),
                    email: Some(format!("{}@email.com", username)),
                    genero: Some("M".into()),
                    idade: Some(30),
                    is_active: Some(true),
                    is_superuser: Some(superuser),
                },
                crate::config::BCRYPT_MIN_COST,
            )
            .await
            .unwrap();
        }
        let state = AppState::new(pool.clone(), &config());
        (create_router(state), pool)
    }

    async fn enviar(
        app: &Router,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", t));
        }
        let request = match body {
            Some(b) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn login(app: &Router, username: &str) -> Value {
        let (status, body) = enviar(
            app,
            Method::POST,
            "/api/token/",
            None,
            Some(json!({ "username": username, "password": "senha123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body
    }

    fn ana() -> Value {
        json!({
            "nome_completo": "Ana",
            "cpf": "111",
            "data_nascimento": "2009-01-15",
            "idade": 17,
            "genero": "F",
            "ativo": true
        })
    }

    #[tokio::test]
    async fn rotas_publicas() {
        let (app, _) = app().await;
        let (status, body) = enviar(&app, Method::GET, "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["mensagem"].is_string());
        let (status, body) = enviar(&app, Method::GET, "/api/test/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["mensagem"].is_string());
    }

    #[tokio::test]
    async fn login_devolve_par_com_claims_da_conta() {
        let (app, pool) = app().await;
        let body = login(&app, "admin").await;
        let admin = usuario_service::find_usuario_by_username(&pool, "admin")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(body["user"]["id"], admin.id);
        assert_eq!(body["user"]["username"], "admin");
        assert_eq!(body["user"]["is_superuser"], true);

        let state = AppState::new(pool, &config());
        let claims = state.tokens.validar_access(body["access"].as_str().unwrap()).unwrap();
        assert_eq!(claims.user_id, admin.id);
        assert_eq!(claims.username, "admin");
        assert!(claims.is_superuser);
        assert!(body["refresh"].is_string());
    }

    #[tokio::test]
    async fn credenciais_invalidas_tem_resposta_generica() {
        let (app, _) = app().await;
        let (s1, b1) = enviar(
            &app,
            Method::POST,
            "/api/token/",
            None,
            Some(json!({ "username": "admin", "password": "errada" })),
        )
        .await;
        let (s2, b2) = enviar(
            &app,
            Method::POST,
            "/api/token/",
            None,
            Some(json!({ "username": "fantasma", "password": "senha123" })),
        )
        .await;
        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!(s2, StatusCode::UNAUTHORIZED);
        assert_eq!(b1, b2);
        assert!(b1.get("access").is_none());
    }

    #[tokio::test]
    async fn rotas_protegidas_exigem_access_token() {
        let (app, _) = app().await;
        for uri in ["/api/me/", "/api/dashboard/", "/api/membros/", "/api/membros/1/"] {
            let (status, _) = enviar(&app, Method::GET, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            let (status, _) = enviar(&app, Method::GET, uri, Some("lixo"), None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        }

        let tokens = login(&app, "joao").await;
        let refresh = tokens["refresh"].as_str().unwrap();
        let (status, body) = enviar(&app, Method::GET, "/api/me/", Some(refresh), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "token_not_valid");
    }

    #[tokio::test]
    async fn refresh_emite_novo_access() {
        let (app, _) = app().await;
        let tokens = login(&app, "joao").await;
        let (status, body) = enviar(
            &app,
            Method::POST,
            "/api/token/refresh/",
            None,
            Some(json!({ "refresh": tokens["refresh"] })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let access = body["access"].as_str().unwrap();

        let (status, me) = enviar(&app, Method::GET, "/api/me/", Some(access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "joao");
        assert_eq!(me["email"], "joao@email.com");
        assert_eq!(me["is_superuser"], false);

        let (status, _) = enviar(
            &app,
            Method::POST,
            "/api/token/refresh/",
            None,
            Some(json!({ "refresh": tokens["access"] })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn criar_ana_reflete_no_dashboard() {
        let (app, _) = app().await;
        let tokens = login(&app, "joao").await;
        let access = tokens["access"].as_str().unwrap();

        let (_, antes) = enviar(&app, Method::GET, "/api/dashboard/", Some(access), None).await;
        let (status, criado) = enviar(&app, Method::POST, "/api/membros/", Some(access), Some(ana())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(criado["nome_completo"], "Ana");
        assert_eq!(criado["usuario_responsavel"], Value::Null);

        let (status, depois) = enviar(&app, Method::GET, "/api/dashboard/", Some(access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            depois["membros"]["total"].as_i64().unwrap(),
            antes["membros"]["total"].as_i64().unwrap() + 1
        );
        assert_eq!(
            depois["por_faixa_etaria"]["0-17"].as_i64().unwrap(),
            antes["por_faixa_etaria"]["0-17"].as_i64().unwrap() + 1
        );
        let generos = depois["por_genero"].as_array().unwrap();
        assert!(generos.contains(&json!({ "genero": "Feminine", "codigo": "F", "total": 1 })));
        assert_eq!(depois["usuarios"]["total"], 2);

        let (_, de_novo) = enviar(&app, Method::GET, "/api/dashboard/", Some(access), None).await;
        assert_eq!(de_novo["membros"], depois["membros"]);
        assert_eq!(de_novo["por_faixa_etaria"], depois["por_faixa_etaria"]);
    }

    #[tokio::test]
    async fn crud_de_membros() {
        let (app, _) = app().await;
        let tokens = login(&app, "joao").await;
        let access = tokens["access"].as_str().unwrap();

        let (_, criado) = enviar(&app, Method::POST, "/api/membros/", Some(access), Some(ana())).await;
        let id = criado["id"].as_i64().unwrap();
        let uri = format!("/api/membros/{}/", id);

        let (status, erros) = enviar(&app, Method::POST, "/api/membros/", Some(access), Some(ana())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(erros["cpf"].is_array());

        let (status, erros) = enviar(&app, Method::POST, "/api/membros/", Some(access), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(erros["nome_completo"].is_array());

        let (status, lista) = enviar(&app, Method::GET, "/api/membros/", Some(access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lista.as_array().unwrap().len(), 1);

        let (status, pagina) =
            enviar(&app, Method::GET, "/api/membros/?page=1&page_size=10", Some(access), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(pagina["count"], 1);

        let (status, alterado) = enviar(
            &app,
            Method::PATCH,
            &uri,
            Some(access),
            Some(json!({ "ministerio": "Louvor", "criado_em": "2000-01-01T00:00:00Z" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(alterado["ministerio"], "Louvor");
        assert_eq!(alterado["criado_em"], criado["criado_em"]);

        let mut completo = ana();
        completo["nome_completo"] = json!("Ana Souza");
        let (status, substituido) = enviar(&app, Method::PUT, &uri, Some(access), Some(completo)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(substituido["nome_completo"], "Ana Souza");
        assert_eq!(substituido["ministerio"], Value::Null);

        let (status, _) = enviar(&app, Method::DELETE, &uri, Some(access), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = enviar(&app, Method::GET, &uri, Some(access), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn parametros_invalidos_respondem_em_json() {
        let (app, _) = app().await;
        let tokens = login(&app, "joao").await;
        let access = tokens["access"].as_str().unwrap();

        let (status, body) = enviar(&app, Method::GET, "/api/membros/abc/", Some(access), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["id"].is_array());

        let (status, body) = enviar(&app, Method::GET, "/api/membros/?page=x", Some(access), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["non_field_errors"].is_array());

        let (status, body) = enviar(
            &app,
            Method::GET,
            "/api/membros/?page=9223372036854775807&page_size=100",
            Some(access),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["page"].is_array());
    }

    #[tokio::test]
    async fn json_malformado_e_erro_de_cliente() {
        let (app, _) = app().await;
        let tokens = login(&app, "joao").await;
        let access = tokens["access"].as_str().unwrap();
        let (status, body) = enviar(
            &app,
            Method::POST,
            "/api/membros/",
            Some(access),
            Some(json!({ "nome_completo": "Ana", "cpf": "1", "data_nascimento": "ontem" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["non_field_errors"].is_array());
    }

    #[tokio::test]
    async fn administracao_de_usuarios_e_referencia_fraca() {
        let (app, pool) = app().await;
        let joao = login(&app, "joao").await;
        let joao_access = joao["access"].as_str().unwrap();
        let (status, _) = enviar(&app, Method::GET, "/api/usuarios/", Some(joao_access), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let admin = login(&app, "admin").await;
        let access = admin["access"].as_str().unwrap();
        let (status, criado) = enviar(
            &app,
            Method::POST,
            "/api/usuarios/",
            Some(access),
            Some(json!({ "username": "pastor", "password": "senha-forte", "genero": "M" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(criado.get("password_hash").is_none());
        let pastor_id = criado["id"].as_i64().unwrap();

        let mut membro = ana();
        membro["usuario_responsavel"] = json!(pastor_id);
        let (_, m) = enviar(&app, Method::POST, "/api/membros/", Some(access), Some(membro)).await;
        assert_eq!(m["usuario_responsavel"], pastor_id);

        let (status, _) = enviar(
            &app,
            Method::DELETE,
            &format!("/api/usuarios/{}/", pastor_id),
            Some(access),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, depois) = enviar(
            &app,
            Method::GET,
            &format!("/api/membros/{}/", m["id"]),
            Some(access),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(depois["usuario_responsavel"], Value::Null);
        assert_eq!(depois["nome_completo"], "Ana");
        assert!(usuario_service::find_usuario_by_id(&pool, pastor_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn conta_desativada_nao_obtem_token() {
        let (app, _) = app().await;
        let admin = login(&app, "admin").await;
        let access = admin["access"].as_str().unwrap();
        let joao_id = login(&app, "joao").await["user"]["id"].as_i64().unwrap();

        let (status, alterado) = enviar(
            &app,
            Method::PATCH,
            &format!("/api/usuarios/{}/", joao_id),
            Some(access),
            Some(json!({ "is_active": false })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(alterado["is_active"], false);

        let (status, _) = enviar(
            &app,
            Method::POST,
            "/api/token/",
            None,
            Some(json!({ "username": "joao", "password": "senha123" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
