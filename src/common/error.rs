use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    #[error("Workspace não encontrado")]
    WorkspaceNotFound,

    #[error("Membro não encontrado neste workspace")]
    MembershipNotFound,

    #[error("Cargo não encontrado")]
    RoleNotFound,

    #[error("Lead não encontrado")]
    LeadNotFound,

    #[error("Endpoint de webhook não encontrado ou inativo")]
    WebhookEndpointNotFound,

    #[error("Acesso negado: {0}")]
    Forbidden(String),

    #[error("Permissão desconhecida: {0}")]
    UnknownPermission(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Assinatura do webhook ausente")]
    SignatureMissing,

    #[error("Assinatura do webhook inválida")]
    SignatureMismatch,

    #[error("Payload inválido: {0}")]
    PayloadInvalid(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Status HTTP gravado no WebhookLog para cada falha do pipeline de
    /// ingestão. 4xx para erro do remetente, 500 para erro de processamento.
    pub fn webhook_status(&self) -> StatusCode {
        match self {
            AppError::WebhookEndpointNotFound => StatusCode::NOT_FOUND,
            AppError::SignatureMissing | AppError::SignatureMismatch => StatusCode::UNAUTHORIZED,
            AppError::PayloadInvalid(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidToken => {
                (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string())
            }
            AppError::JwtError(_) => {
                (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string())
            }
            AppError::WorkspaceNotFound
            | AppError::MembershipNotFound
            | AppError::RoleNotFound
            | AppError::LeadNotFound
            | AppError::WebhookEndpointNotFound => (StatusCode::NOT_FOUND, self.to_string()),

            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, self.to_string()),

            AppError::UnknownPermission(_) | AppError::PayloadInvalid(_) => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }

            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, self.to_string()),

            AppError::SignatureMissing | AppError::SignatureMismatch => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe algo genérico.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
