// src/handlers/activities.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::activity::Activity,
    models::rbac::{Action, Resource},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityListQuery {
    pub workspace_id: Option<Uuid>,
    pub limit: Option<i64>,
}

// GET /api/activities?workspaceId=&limit=
// Sem contexto de workspace a resposta é uma lista vazia, não um erro.
pub async fn list_activities(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<ActivityListQuery>,
) -> Result<Json<Vec<Activity>>, AppError> {
    let Some(workspace_id) = query.workspace_id else {
        return Ok(Json(Vec::new()));
    };

    app_state
        .rbac_service
        .authorize(user.id, workspace_id, Resource::Activities, Action::Read)
        .await?;

    let activities = app_state
        .activity_service
        .list(workspace_id, query.limit)
        .await?;

    Ok(Json(activities))
}
