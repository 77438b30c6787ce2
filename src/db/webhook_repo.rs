// src/db/webhook_repo.rs

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::webhook::{WebhookEndpoint, WebhookLog};

#[derive(Clone)]
pub struct WebhookRepository {
    pool: PgPool,
}

impl WebhookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_endpoint(
        &self,
        workspace_id: Uuid,
        name: &str,
        url_token: &str,
        secret: &str,
        provider: &str,
        events: &[String],
        created_by: Option<Uuid>,
    ) -> Result<WebhookEndpoint, AppError> {
        sqlx::query_as::<_, WebhookEndpoint>(
            r#"
            INSERT INTO webhook_endpoints (workspace_id, name, url_token, secret, provider, events, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(name)
        .bind(url_token)
        .bind(secret)
        .bind(provider)
        .bind(events)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // O token é gerado com 24 bytes de entropia; colisão aqui é
            // praticamente impossível, mas a restrição UNIQUE é a garantia.
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Colisão de token de webhook, tente novamente.".into(),
                    );
                }
            }
            e.into()
        })
    }

    /// Resolve o endpoint de uma entrega de entrada pelo token da URL.
    /// Endpoints desativados não recebem entregas.
    pub async fn find_active_by_token(
        &self,
        url_token: &str,
    ) -> Result<Option<WebhookEndpoint>, AppError> {
        let endpoint = sqlx::query_as::<_, WebhookEndpoint>(
            "SELECT * FROM webhook_endpoints WHERE url_token = $1 AND is_active = TRUE",
        )
        .bind(url_token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(endpoint)
    }

    pub async fn find_endpoint(
        &self,
        workspace_id: Uuid,
        endpoint_id: Uuid,
    ) -> Result<Option<WebhookEndpoint>, AppError> {
        let endpoint = sqlx::query_as::<_, WebhookEndpoint>(
            "SELECT * FROM webhook_endpoints WHERE workspace_id = $1 AND id = $2",
        )
        .bind(workspace_id)
        .bind(endpoint_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(endpoint)
    }

    pub async fn list_endpoints(
        &self,
        workspace_id: Uuid,
    ) -> Result<Vec<WebhookEndpoint>, AppError> {
        let endpoints = sqlx::query_as::<_, WebhookEndpoint>(
            "SELECT * FROM webhook_endpoints WHERE workspace_id = $1 ORDER BY created_at ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(endpoints)
    }

    /// Atualização parcial: campos ausentes mantêm o valor atual.
    /// O token e o segredo são imutáveis após a criação.
    pub async fn update_endpoint(
        &self,
        workspace_id: Uuid,
        endpoint_id: Uuid,
        name: Option<&str>,
        provider: Option<&str>,
        events: Option<&[String]>,
        is_active: Option<bool>,
    ) -> Result<WebhookEndpoint, AppError> {
        let endpoint = sqlx::query_as::<_, WebhookEndpoint>(
            r#"
            UPDATE webhook_endpoints
            SET name      = COALESCE($3, name),
                provider  = COALESCE($4, provider),
                events    = COALESCE($5, events),
                is_active = COALESCE($6, is_active),
                updated_at = NOW()
            WHERE workspace_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(endpoint_id)
        .bind(name)
        .bind(provider)
        .bind(events)
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?;

        endpoint.ok_or(AppError::WebhookEndpointNotFound)
    }

    /// Desativação é um flag, não exclusão: os logs do endpoint permanecem.
    pub async fn deactivate(
        &self,
        workspace_id: Uuid,
        endpoint_id: Uuid,
    ) -> Result<WebhookEndpoint, AppError> {
        let endpoint = sqlx::query_as::<_, WebhookEndpoint>(
            r#"
            UPDATE webhook_endpoints
            SET is_active = FALSE, updated_at = NOW()
            WHERE workspace_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(endpoint_id)
        .fetch_optional(&self.pool)
        .await?;

        endpoint.ok_or(AppError::WebhookEndpointNotFound)
    }

    /// Uma linha por tentativa de ingestão, sucesso ou falha.
    pub async fn insert_log(
        &self,
        webhook_endpoint_id: Uuid,
        request_id: Uuid,
        event_type: &str,
        payload: &Value,
        response_status: i32,
        response_body: Option<&Value>,
        error_message: Option<&str>,
    ) -> Result<WebhookLog, AppError> {
        let log = sqlx::query_as::<_, WebhookLog>(
            r#"
            INSERT INTO webhook_logs (
                webhook_endpoint_id, request_id, event_type, payload,
                response_status, response_body, error_message
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(webhook_endpoint_id)
        .bind(request_id)
        .bind(event_type)
        .bind(payload)
        .bind(response_status)
        .bind(response_body)
        .bind(error_message)
        .fetch_one(&self.pool)
        .await?;

        Ok(log)
    }

    pub async fn list_logs(
        &self,
        webhook_endpoint_id: Uuid,
        limit: i64,
    ) -> Result<Vec<WebhookLog>, AppError> {
        let logs = sqlx::query_as::<_, WebhookLog>(
            r#"
            SELECT * FROM webhook_logs
            WHERE webhook_endpoint_id = $1
            ORDER BY processed_at DESC
            LIMIT $2
            "#,
        )
        .bind(webhook_endpoint_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(logs)
    }
}
