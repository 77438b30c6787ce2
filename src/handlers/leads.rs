// src/handlers/leads.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            PermLeadsAssign, PermLeadsCreate, PermLeadsDelete, PermLeadsRead, PermLeadsUpdate,
            RequirePermission,
        },
        workspace::WorkspaceContext,
    },
    models::lead::{AssignLeadPayload, CreateLeadPayload, Lead, UpdateLeadStatusPayload},
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct LeadListQuery {
    pub limit: Option<i64>,
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = CreateLeadPayload,
    responses(
        (status = 201, description = "Lead criado", body = Lead),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermLeadsCreate>,
    Json(payload): Json<CreateLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let lead = app_state
        .lead_service
        .create_lead(workspace.0, user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(lead)))
}

// GET /api/leads
#[utoipa::path(
    get,
    path = "/api/leads",
    tag = "Leads",
    params(
        LeadListQuery,
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    responses(
        (status = 200, description = "Leads do workspace, mais recentes primeiro", body = Vec<Lead>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leads(
    State(app_state): State<AppState>,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermLeadsRead>,
    Query(query): Query<LeadListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let leads = app_state
        .lead_service
        .list_leads(workspace.0, query.limit)
        .await?;

    Ok(Json(leads))
}

// PATCH /api/leads/{id}/status
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/status",
    tag = "Leads",
    request_body = UpdateLeadStatusPayload,
    responses(
        (status = 200, description = "Status atualizado", body = Lead),
        (status = 404, description = "Lead não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead"),
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_lead_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermLeadsUpdate>,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<UpdateLeadStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .update_status(workspace.0, lead_id, &payload.status, user.id)
        .await?;

    Ok(Json(lead))
}

// PATCH /api/leads/{id}/assign
#[utoipa::path(
    patch,
    path = "/api/leads/{id}/assign",
    tag = "Leads",
    request_body = AssignLeadPayload,
    responses(
        (status = 200, description = "Lead atribuído", body = Lead)
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead"),
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermLeadsAssign>,
    Path(lead_id): Path<Uuid>,
    Json(payload): Json<AssignLeadPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lead = app_state
        .lead_service
        .assign(workspace.0, lead_id, payload.assigned_to, user.id)
        .await?;

    Ok(Json(lead))
}

// DELETE /api/leads/{id}
#[utoipa::path(
    delete,
    path = "/api/leads/{id}",
    tag = "Leads",
    responses(
        (status = 204, description = "Lead excluído"),
        (status = 404, description = "Lead não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Lead"),
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_lead(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermLeadsDelete>,
    Path(lead_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .lead_service
        .delete_lead(workspace.0, lead_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
