// src/handlers/workspaces.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermMembersCreate, PermMembersRead, PermMembersUpdate, RequirePermission},
        workspace::WorkspaceContext,
    },
    models::workspace::{
        CreateMemberPayload, CreateWorkspacePayload, UpdateMemberRolePayload,
        UpdateMemberStatusPayload, Workspace,
    },
};

// =============================================================================
//  ÁREA 1: WORKSPACES
// =============================================================================

// POST /api/workspaces
#[utoipa::path(
    post,
    path = "/api/workspaces",
    tag = "Workspaces",
    request_body = CreateWorkspacePayload,
    responses(
        (status = 201, description = "Workspace criado com o criador como dono", body = Workspace),
        (status = 409, description = "Slug já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_workspace(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateWorkspacePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let workspace = app_state
        .workspace_service
        .create_workspace_with_owner(&payload.name, payload.slug.as_deref(), user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(workspace)))
}

// GET /api/workspaces
#[utoipa::path(
    get,
    path = "/api/workspaces",
    tag = "Workspaces",
    responses(
        (status = 200, description = "Workspaces em que o usuário é membro ativo", body = Vec<Workspace>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_workspaces(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let workspaces = app_state
        .workspace_service
        .list_user_workspaces(user.id)
        .await?;

    Ok(Json(workspaces))
}

// =============================================================================
//  ÁREA 2: MEMBROS
// =============================================================================

// POST /api/members
pub async fn create_member(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermMembersCreate>,
    Json(payload): Json<CreateMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let member = app_state
        .workspace_service
        .create_member(
            workspace.0,
            user.id,
            payload.user_id,
            payload.role_id,
            payload.status,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(member)))
}

// GET /api/members
pub async fn list_members(
    State(app_state): State<AppState>,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermMembersRead>,
) -> Result<impl IntoResponse, AppError> {
    let members = app_state.workspace_service.list_members(workspace.0).await?;

    Ok(Json(members))
}

// GET /api/members/me
// O vínculo do próprio usuário com o workspace do contexto.
pub async fn my_membership(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state
        .workspace_service
        .get_membership(workspace.0, user.id)
        .await?;

    Ok(Json(member))
}

// PATCH /api/members/{id}/status
pub async fn update_member_status(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermMembersUpdate>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state
        .workspace_service
        .update_member_status(workspace.0, member_id, payload.status, user.id)
        .await?;

    Ok(Json(member))
}

// PATCH /api/members/{id}/role
pub async fn update_member_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermMembersUpdate>,
    Path(member_id): Path<Uuid>,
    Json(payload): Json<UpdateMemberRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let member = app_state
        .workspace_service
        .update_member_role(workspace.0, member_id, payload.role_id, user.id)
        .await?;

    Ok(Json(member))
}
