// src/models/activity.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Tipos de atividade reconhecidos pela trilha de auditoria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "activity_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Created,
    Updated,
    Deleted,
    Assigned,
    StatusChanged,
    RoleChanged,
    NoteAdded,
    EmailSent,
    CallMade,
    MeetingScheduled,
}

// Registro imutável de auditoria. O contrato público não expõe
// UPDATE nem DELETE; mutações repetidas geram linhas repetidas.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,

    #[schema(ignore)]
    pub workspace_id: Uuid,

    // None quando a mutação veio de um sistema externo (ex.: webhook).
    pub performed_by: Option<Uuid>,

    pub activity_type: ActivityType,

    #[schema(example = "lead")]
    pub entity_type: String,

    pub entity_id: Option<Uuid>,

    #[schema(example = "Lead criado via webhook")]
    pub description: String,

    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}
