// src/handlers/webhooks.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
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
            PermWebhooksCreate, PermWebhooksDelete, PermWebhooksRead, PermWebhooksUpdate,
            RequirePermission,
        },
        workspace::WorkspaceContext,
    },
    models::webhook::{
        CreateWebhookEndpointPayload, UpdateWebhookEndpointPayload, WebhookEndpoint,
        WebhookEndpointCreated, WebhookLog,
    },
};

// Cabeçalho da assinatura HMAC das entregas de entrada
const SIGNATURE_HEADER: &str = "x-webhook-signature";

#[derive(Debug, Deserialize, IntoParams)]
pub struct LogListQuery {
    pub limit: Option<i64>,
}

// =============================================================================
//  ÁREA 1: GESTÃO DE ENDPOINTS (autenticada)
// =============================================================================

// POST /api/webhooks
#[utoipa::path(
    post,
    path = "/api/webhooks",
    tag = "Webhooks",
    request_body = CreateWebhookEndpointPayload,
    responses(
        (status = 201, description = "Endpoint criado; o segredo só aparece aqui", body = WebhookEndpointCreated)
    ),
    params(
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_webhook(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermWebhooksCreate>,
    Json(payload): Json<CreateWebhookEndpointPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let created = app_state
        .webhook_service
        .create_endpoint(workspace.0, user.id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/webhooks
#[utoipa::path(
    get,
    path = "/api/webhooks",
    tag = "Webhooks",
    responses(
        (status = 200, description = "Endpoints do workspace", body = Vec<WebhookEndpoint>)
    ),
    params(
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_webhooks(
    State(app_state): State<AppState>,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermWebhooksRead>,
) -> Result<impl IntoResponse, AppError> {
    let endpoints = app_state.webhook_service.list_endpoints(workspace.0).await?;

    Ok(Json(endpoints))
}

// PUT /api/webhooks/{id}
#[utoipa::path(
    put,
    path = "/api/webhooks/{id}",
    tag = "Webhooks",
    request_body = UpdateWebhookEndpointPayload,
    responses(
        (status = 200, description = "Endpoint atualizado", body = WebhookEndpoint),
        (status = 404, description = "Endpoint não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Endpoint"),
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_webhook(
    State(app_state): State<AppState>,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermWebhooksUpdate>,
    Path(endpoint_id): Path<Uuid>,
    Json(payload): Json<UpdateWebhookEndpointPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let endpoint = app_state
        .webhook_service
        .update_endpoint(workspace.0, endpoint_id, payload)
        .await?;

    Ok(Json(endpoint))
}

// DELETE /api/webhooks/{id}
// Desativa o endpoint; os logs de entrega permanecem.
#[utoipa::path(
    delete,
    path = "/api/webhooks/{id}",
    tag = "Webhooks",
    responses(
        (status = 200, description = "Endpoint desativado", body = WebhookEndpoint),
        (status = 404, description = "Endpoint não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Endpoint"),
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    security(("api_jwt" = []))
)]
pub async fn deactivate_webhook(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermWebhooksDelete>,
    Path(endpoint_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let endpoint = app_state
        .webhook_service
        .deactivate_endpoint(workspace.0, endpoint_id, user.id)
        .await?;

    Ok(Json(endpoint))
}

// GET /api/webhooks/{id}/logs
// A trilha de entregas é o único mecanismo de "retry": não há reentrega
// automática, só a falha registrada para inspeção manual.
#[utoipa::path(
    get,
    path = "/api/webhooks/{id}/logs",
    tag = "Webhooks",
    params(
        LogListQuery,
        ("id" = Uuid, Path, description = "ID do Endpoint"),
        ("x-workspace-id" = Uuid, Header, description = "ID do Workspace")
    ),
    responses(
        (status = 200, description = "Tentativas de entrega, mais recentes primeiro", body = Vec<WebhookLog>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_webhook_logs(
    State(app_state): State<AppState>,
    workspace: WorkspaceContext,
    _perm: RequirePermission<PermWebhooksRead>,
    Path(endpoint_id): Path<Uuid>,
    Query(query): Query<LogListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let logs = app_state
        .webhook_service
        .list_logs(workspace.0, endpoint_id, query.limit)
        .await?;

    Ok(Json(logs))
}

// =============================================================================
//  ÁREA 2: ENTREGA PÚBLICA
// =============================================================================

// POST /api/hooks/{token}
// A rota pública que os sistemas externos chamam. Nunca devolve erro cru:
// o pipeline contém as falhas e responde o envelope {success, ...}.
#[utoipa::path(
    post,
    path = "/api/hooks/{token}",
    tag = "Webhooks",
    request_body(content = String, description = "Corpo cru do webhook", content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Lead criado a partir do payload"),
        (status = 401, description = "Assinatura ausente ou inválida"),
        (status = 404, description = "Endpoint não encontrado ou inativo")
    ),
    params(
        ("token" = String, Path, description = "Token gerado na criação do endpoint"),
        ("x-webhook-signature" = Option<String>, Header, description = "sha256=<hex do HMAC do corpo>")
    )
)]
pub async fn receive_delivery(
    State(app_state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let outcome = app_state
        .webhook_service
        .ingest(&token, signature, &body)
        .await;

    (outcome.status, Json(outcome.body))
}
