// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermRolesCreate, PermRolesDelete, PermRolesRead, RequirePermission},
        workspace::WorkspaceContext,
    },
    models::rbac::CreateRolePayload,
};

// POST /api/roles
pub async fn create_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermRolesCreate>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let role = app_state
        .rbac_service
        .create_role(
            workspace.0,
            user.id,
            payload.name,
            payload.description,
            payload.permissions,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(role)))
}

// GET /api/roles
pub async fn list_roles(
    State(app_state): State<AppState>,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermRolesRead>,
) -> Result<impl IntoResponse, AppError> {
    let roles = app_state.rbac_service.list_roles(workspace.0).await?;

    Ok(Json(roles))
}

// DELETE /api/roles/{id}
// Os membros do cargo excluído caem para o cargo padrão do workspace.
pub async fn delete_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermRolesDelete>,
    Path(role_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .rbac_service
        .delete_role(workspace.0, role_id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/permissions (Para o frontend saber o que mostrar na tela de cargos)
pub async fn list_permissions(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.rbac_service.list_system_permissions())
}
