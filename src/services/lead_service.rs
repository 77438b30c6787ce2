// src/services/lead_service.rs

use rust_decimal::Decimal;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, WorkspaceRepository},
    models::activity::ActivityType,
    models::lead::{CreateLeadPayload, Lead, LeadDraft},
    services::activity_service::ActivityService,
};

#[derive(Clone)]
pub struct LeadService {
    lead_repo: LeadRepository,
    workspace_repo: WorkspaceRepository,
    activity: ActivityService,
    pool: PgPool,
}

impl LeadService {
    pub fn new(
        lead_repo: LeadRepository,
        workspace_repo: WorkspaceRepository,
        activity: ActivityService,
        pool: PgPool,
    ) -> Self {
        Self {
            lead_repo,
            workspace_repo,
            activity,
            pool,
        }
    }

    /// Criação manual (UI/API). O caminho de webhook converge no mesmo
    /// repositório, mas chega lá pelo pipeline de ingestão.
    pub async fn create_lead(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        payload: CreateLeadPayload,
    ) -> Result<Lead, AppError> {
        let workspace = self
            .workspace_repo
            .find_workspace(workspace_id)
            .await?
            .ok_or(AppError::WorkspaceNotFound)?;

        let draft = LeadDraft {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            company: payload.company,
            source: payload.source.unwrap_or_else(|| "manual".to_string()),
            value: payload.value.unwrap_or(Decimal::ZERO),
            status: payload.status,
            tags: payload.tags.unwrap_or_default(),
            notes: payload.notes,
            custom_fields: if payload.custom_fields.is_object() {
                payload.custom_fields
            } else {
                json!({})
            },
        };

        let status = draft
            .status
            .clone()
            .unwrap_or(workspace.default_lead_status);

        let lead = self
            .lead_repo
            .create_lead(&self.pool, workspace_id, &draft, &status, Some(actor))
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Created,
                "lead",
                Some(lead.id),
                &format!("Lead '{}' criado", lead.name),
                json!({ "source": lead.source }),
            )
            .await;

        Ok(lead)
    }

    pub async fn list_leads(&self, workspace_id: Uuid, limit: Option<i64>) -> Result<Vec<Lead>, AppError> {
        let limit = limit.unwrap_or(100).clamp(1, 500);
        self.lead_repo.list_leads(workspace_id, limit).await
    }

    pub async fn update_status(
        &self,
        workspace_id: Uuid,
        lead_id: Uuid,
        new_status: &str,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let current = self
            .lead_repo
            .find_lead(workspace_id, lead_id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        let updated = self
            .lead_repo
            .update_status(workspace_id, lead_id, new_status)
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::StatusChanged,
                "lead",
                Some(lead_id),
                "Status do lead alterado",
                json!({ "oldStatus": current.status, "newStatus": updated.status }),
            )
            .await;

        Ok(updated)
    }

    pub async fn assign(
        &self,
        workspace_id: Uuid,
        lead_id: Uuid,
        assigned_to: Uuid,
        actor: Uuid,
    ) -> Result<Lead, AppError> {
        let updated = self
            .lead_repo
            .assign(workspace_id, lead_id, assigned_to)
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Assigned,
                "lead",
                Some(lead_id),
                "Lead atribuído",
                json!({ "assignedTo": assigned_to }),
            )
            .await;

        Ok(updated)
    }

    /// Exclusão explícita. No fluxo normal um lead não some do funil,
    /// só muda de status.
    pub async fn delete_lead(
        &self,
        workspace_id: Uuid,
        lead_id: Uuid,
        actor: Uuid,
    ) -> Result<(), AppError> {
        let lead = self
            .lead_repo
            .find_lead(workspace_id, lead_id)
            .await?
            .ok_or(AppError::LeadNotFound)?;

        self.lead_repo.delete_lead(workspace_id, lead_id).await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Deleted,
                "lead",
                Some(lead_id),
                &format!("Lead '{}' excluído", lead.name),
                json!({}),
            )
            .await;

        Ok(())
    }
}
