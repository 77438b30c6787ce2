// src/models/webhook.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O que sai do banco (Tabela WebhookEndpoints)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEndpoint {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub workspace_id: Uuid,

    #[schema(example = "Formulário do site")]
    pub name: String,

    // O token que identifica o endpoint na URL pública de entrega.
    // Gerado na criação e imutável; é a chave de despacho global.
    #[schema(example = "a3f1c9e2b4d6...")]
    pub url_token: String,

    // Segredo do HMAC-SHA256 das entregas. Só é exibido na criação.
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub secret: String,

    #[schema(example = "generic")]
    pub provider: String,

    pub is_active: bool,

    #[schema(example = json!(["lead.created", "lead.updated"]))]
    pub events: Vec<String>,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Uma linha por tentativa de entrega, sucesso ou falha.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLog {
    pub id: Uuid,
    pub webhook_endpoint_id: Uuid,
    pub request_id: Uuid,

    #[schema(example = "lead.created")]
    pub event_type: String,

    pub payload: Value,

    #[schema(example = 200)]
    pub response_status: i32,

    pub response_body: Option<Value>,
    pub error_message: Option<String>,
    pub processed_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookEndpointPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Formulário do site")]
    pub name: String,

    // Qual transformador de payload aplicar nas entregas deste endpoint.
    #[schema(example = "generic")]
    pub provider: Option<String>,

    // Se ausente, assume {lead.created, lead.updated}.
    #[schema(example = json!(["lead.created"]))]
    pub events: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWebhookEndpointPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    pub name: Option<String>,
    pub provider: Option<String>,
    pub events: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

// Resposta da criação: a única vez em que o segredo é exposto.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEndpointCreated {
    #[serde(flatten)]
    pub endpoint: WebhookEndpoint,

    #[schema(example = "9f2d8c1a...")]
    pub secret: String,

    // Caminho público de entrega montado a partir do token.
    #[schema(example = "/api/hooks/a3f1c9e2b4d6")]
    pub delivery_path: String,
}
