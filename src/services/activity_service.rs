// src/services/activity_service.rs

use serde_json::Value;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::ActivityRepository;
use crate::models::activity::{Activity, ActivityType};

// Limite máximo de leitura da trilha; o consumidor pode pedir menos.
const MAX_PAGE: i64 = 200;

#[derive(Clone)]
pub struct ActivityService {
    repo: ActivityRepository,
}

impl ActivityService {
    pub fn new(repo: ActivityRepository) -> Self {
        Self { repo }
    }

    /// Registra uma atividade em melhor esforço: a trilha é um efeito
    /// colateral, então falha aqui nunca aborta a mutação principal.
    /// O erro vai para o canal operacional (tracing) e morre aqui.
    pub async fn record(
        &self,
        workspace_id: Uuid,
        performed_by: Option<Uuid>,
        activity_type: ActivityType,
        entity_type: &str,
        entity_id: Option<Uuid>,
        description: &str,
        metadata: Value,
    ) {
        if let Err(err) = self
            .repo
            .insert(
                workspace_id,
                performed_by,
                activity_type,
                entity_type,
                entity_id,
                description,
                &metadata,
            )
            .await
        {
            tracing::error!(
                "Falha ao registrar atividade '{}' ({}) no workspace {}: {}",
                description,
                entity_type,
                workspace_id,
                err
            );
        }
    }

    pub async fn list(&self, workspace_id: Uuid, limit: Option<i64>) -> Result<Vec<Activity>, AppError> {
        let limit = limit.unwrap_or(50).clamp(1, MAX_PAGE);
        self.repo.list(workspace_id, limit).await
    }
}
