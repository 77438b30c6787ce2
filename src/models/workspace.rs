// src/models/workspace.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. Workspace (O "Estabelecimento")
// ---
// A fronteira de isolamento: leads, cargos, webhooks e atividades
// pertencem a exatamente um workspace.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub default_lead_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Status do membro
// ---
// Apenas `active` autoriza qualquer coisa; as demais variantes bloqueiam
// o acesso independente do cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Pending,
    Active,
    Inactive,
    Suspended,
}

// ---
// 3. WorkspaceMember (A "Ponte" Usuário-Workspace)
// ---
// Único por (workspace_id, user_id). Nunca é apagado fisicamente no fluxo
// normal; desligamento vira status `inactive`.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMember {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub user_id: Uuid,

    // Nullable: um cargo apagado fora do fluxo normal deixa o membro
    // sem cargo, e a autorização nega por padrão.
    pub role_id: Option<Uuid>,

    pub status: MemberStatus,
    pub invited_by: Option<Uuid>,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 4. Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspacePayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Imobiliária Horizonte")]
    pub name: String,

    // Se ausente, o slug é derivado do nome.
    #[schema(example = "imobiliaria-horizonte")]
    pub slug: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemberPayload {
    pub user_id: Uuid,
    pub role_id: Uuid,

    // Convites normalmente entram como `pending`.
    pub status: Option<MemberStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberStatusPayload {
    pub status: MemberStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemberRolePayload {
    pub role_id: Uuid,
}
