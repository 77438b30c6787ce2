// src/db/lead_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::lead::{Lead, LeadDraft};

#[derive(Clone)]
pub struct LeadRepository {
    pool: PgPool,
}

impl LeadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persiste um rascunho de lead no workspace. O `status` chega aqui já
    /// resolvido (payload ou padrão do workspace).
    pub async fn create_lead<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        draft: &LeadDraft,
        status: &str,
        created_by: Option<Uuid>,
    ) -> Result<Lead, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                workspace_id, name, email, phone, company,
                source, value, status, tags, notes, custom_fields, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(&draft.name)
        .bind(draft.email.as_deref())
        .bind(draft.phone.as_deref())
        .bind(draft.company.as_deref())
        .bind(&draft.source)
        .bind(draft.value)
        .bind(status)
        .bind(&draft.tags)
        .bind(draft.notes.as_deref())
        .bind(&draft.custom_fields)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(lead)
    }

    pub async fn find_lead(&self, workspace_id: Uuid, lead_id: Uuid) -> Result<Option<Lead>, AppError> {
        let lead = sqlx::query_as::<_, Lead>("SELECT * FROM leads WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(lead_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lead)
    }

    pub async fn list_leads(&self, workspace_id: Uuid, limit: i64) -> Result<Vec<Lead>, AppError> {
        let leads = sqlx::query_as::<_, Lead>(
            r#"
            SELECT * FROM leads
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    pub async fn update_status(
        &self,
        workspace_id: Uuid,
        lead_id: Uuid,
        status: &str,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET status = $3, updated_at = NOW()
            WHERE workspace_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(lead_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        lead.ok_or(AppError::LeadNotFound)
    }

    pub async fn assign(
        &self,
        workspace_id: Uuid,
        lead_id: Uuid,
        assigned_to: Uuid,
    ) -> Result<Lead, AppError> {
        let lead = sqlx::query_as::<_, Lead>(
            r#"
            UPDATE leads
            SET assigned_to = $3, updated_at = NOW()
            WHERE workspace_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(lead_id)
        .bind(assigned_to)
        .fetch_optional(&self.pool)
        .await?;

        lead.ok_or(AppError::LeadNotFound)
    }

    pub async fn delete_lead(&self, workspace_id: Uuid, lead_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM leads WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(lead_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
