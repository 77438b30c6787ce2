// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::db::{
    ActivityRepository, LeadRepository, RoleRepository, WebhookRepository, WorkspaceRepository,
};
use crate::services::{
    ActivityService, AuthService, LeadService, RbacService, WebhookService, WorkspaceService,
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    // O guard de workspace consulta o vínculo direto no repositório
    pub workspace_repo: WorkspaceRepository,
    pub rbac_service: RbacService,
    pub workspace_service: WorkspaceService,
    pub lead_service: LeadService,
    pub webhook_service: WebhookService,
    pub activity_service: ActivityService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem decide
    // abortar é o main.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Exigência de assinatura HMAC nas entregas de webhook (padrão: exigida).
        // WEBHOOK_REQUIRE_SIGNATURE=false aceita entregas sem cabeçalho de
        // assinatura; quando o cabeçalho vem, ele é verificado de toda forma.
        let require_signature = env::var("WEBHOOK_REQUIRE_SIGNATURE")
            .map(|v| v != "false")
            .unwrap_or(true);

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let workspace_repo = WorkspaceRepository::new(db_pool.clone());
        let role_repo = RoleRepository::new(db_pool.clone());
        let lead_repo = LeadRepository::new(db_pool.clone());
        let webhook_repo = WebhookRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());

        let activity_service = ActivityService::new(activity_repo);
        let auth_service = AuthService::new(jwt_secret);

        let rbac_service = RbacService::new(
            role_repo.clone(),
            workspace_repo.clone(),
            activity_service.clone(),
            db_pool.clone(),
        );

        let workspace_service = WorkspaceService::new(
            workspace_repo.clone(),
            role_repo.clone(),
            rbac_service.clone(),
            activity_service.clone(),
            db_pool.clone(),
        );

        let lead_service = LeadService::new(
            lead_repo.clone(),
            workspace_repo.clone(),
            activity_service.clone(),
            db_pool.clone(),
        );

        let webhook_service = WebhookService::new(
            webhook_repo,
            lead_repo,
            workspace_repo.clone(),
            activity_service.clone(),
            db_pool.clone(),
            require_signature,
        );

        Ok(Self {
            db_pool,
            auth_service,
            workspace_repo,
            rbac_service,
            workspace_service,
            lead_service,
            webhook_service,
            activity_service,
        })
    }
}
