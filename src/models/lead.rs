// src/models/lead.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O que sai do banco (Tabela Leads)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub workspace_id: Uuid,

    #[schema(example = "Jane Doe")]
    pub name: String,

    #[schema(example = "jane@exemplo.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,

    #[schema(example = "webhook")]
    pub source: String,

    #[schema(value_type = f64, example = 2500.0)]
    pub value: Decimal,

    #[schema(example = "new")]
    pub status: String,

    pub assigned_to: Option<Uuid>,

    #[schema(example = json!(["quente", "2026"]))]
    pub tags: Vec<String>,

    pub notes: Option<String>,

    #[schema(example = json!({"campanha": "verao"}))]
    pub custom_fields: Value,

    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// O rascunho canônico de criação de lead.
// ---
// É o que os transformadores de payload produzem e o que o repositório
// persiste; tanto o pipeline de webhook quanto a API manual convergem aqui.
#[derive(Debug, Clone, PartialEq)]
pub struct LeadDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub source: String,
    pub value: Decimal,
    // None = usar o status padrão do workspace
    pub status: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub custom_fields: Value,
}

impl Default for LeadDraft {
    fn default() -> Self {
        LeadDraft {
            name: "Unknown".to_string(),
            email: None,
            phone: None,
            company: None,
            source: "webhook".to_string(),
            value: Decimal::ZERO,
            status: None,
            tags: Vec::new(),
            notes: None,
            custom_fields: json!({}),
        }
    }
}

// ---
// Payloads da API manual
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeadPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Jane Doe")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "jane@exemplo.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,

    #[schema(example = "manual")]
    pub source: Option<String>,

    #[schema(value_type = Option<f64>, example = 2500.0)]
    pub value: Option<Decimal>,

    pub status: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,

    #[serde(default)]
    #[schema(example = json!({"campanha": "verao"}))]
    pub custom_fields: Value,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeadStatusPayload {
    #[schema(example = "qualified")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignLeadPayload {
    pub assigned_to: Uuid,
}
