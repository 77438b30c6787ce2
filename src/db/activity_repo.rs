// src/db/activity_repo.rs

use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::activity::{Activity, ActivityType};

// Repositório da trilha de auditoria. Só existem INSERT e SELECT aqui;
// a tabela não é atualizada nem apagada pelo contrato público.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        workspace_id: Uuid,
        performed_by: Option<Uuid>,
        activity_type: ActivityType,
        entity_type: &str,
        entity_id: Option<Uuid>,
        description: &str,
        metadata: &Value,
    ) -> Result<Activity, AppError> {
        let activity = sqlx::query_as::<_, Activity>(
            r#"
            INSERT INTO activities (
                workspace_id, performed_by, activity_type,
                entity_type, entity_id, description, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(performed_by)
        .bind(activity_type)
        .bind(entity_type)
        .bind(entity_id)
        .bind(description)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await?;

        Ok(activity)
    }

    /// Leitura ordenada do mais recente para o mais antigo, sempre limitada.
    pub async fn list(&self, workspace_id: Uuid, limit: i64) -> Result<Vec<Activity>, AppError> {
        let activities = sqlx::query_as::<_, Activity>(
            r#"
            SELECT * FROM activities
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }
}
