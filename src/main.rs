//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

// Importações principais
use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;
use crate::middleware::workspace::workspace_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de workspace (exigem apenas autenticação; ainda não há contexto)
    let workspace_routes = Router::new()
        .route(
            "/",
            post(handlers::workspaces::create_workspace).get(handlers::workspaces::list_my_workspaces),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Rotas de membros (autenticação + contexto de workspace ativo)
    let member_routes = Router::new()
        .route(
            "/",
            post(handlers::workspaces::create_member).get(handlers::workspaces::list_members),
        )
        .route("/me", get(handlers::workspaces::my_membership))
        .route("/{id}/status", patch(handlers::workspaces::update_member_status))
        .route("/{id}/role", patch(handlers::workspaces::update_member_role))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            workspace_guard,
        ));

    let role_routes = Router::new()
        .route(
            "/",
            post(handlers::rbac::create_role).get(handlers::rbac::list_roles),
        )
        .route("/{id}", delete(handlers::rbac::delete_role))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            workspace_guard,
        ));

    let lead_routes = Router::new()
        .route(
            "/",
            post(handlers::leads::create_lead).get(handlers::leads::list_leads),
        )
        .route("/{id}/status", patch(handlers::leads::update_lead_status))
        .route("/{id}/assign", patch(handlers::leads::assign_lead))
        .route("/{id}", delete(handlers::leads::delete_lead))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            workspace_guard,
        ));

    let webhook_routes = Router::new()
        .route(
            "/",
            post(handlers::webhooks::create_webhook).get(handlers::webhooks::list_webhooks),
        )
        .route(
            "/{id}",
            axum::routing::put(handlers::webhooks::update_webhook)
                .delete(handlers::webhooks::deactivate_webhook),
        )
        .route("/{id}/logs", get(handlers::webhooks::list_webhook_logs))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            workspace_guard,
        ));

    // A trilha de atividades usa workspaceId por query string e responde
    // lista vazia quando não há contexto
    let activity_routes = Router::new()
        .route("/", get(handlers::activities::list_activities))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        // A rota pública de entrega: sistemas externos postam aqui
        .route("/api/hooks/{token}", post(handlers::webhooks::receive_delivery))
        .nest("/api/workspaces", workspace_routes)
        .nest("/api/members", member_routes)
        .nest("/api/roles", role_routes)
        .nest("/api/leads", lead_routes)
        .nest("/api/webhooks", webhook_routes)
        .nest("/api/activities", activity_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
