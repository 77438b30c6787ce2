// src/services/webhook_service.rs

use axum::http::StatusCode;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde_json::{json, Value};
use sha2::Sha256;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LeadRepository, WebhookRepository, WorkspaceRepository},
    models::activity::ActivityType,
    models::webhook::{
        CreateWebhookEndpointPayload, UpdateWebhookEndpointPayload, WebhookEndpoint,
        WebhookEndpointCreated, WebhookLog,
    },
    services::{activity_service::ActivityService, transformers},
};

type HmacSha256 = Hmac<Sha256>;

// Eventos assinados por padrão quando o payload de criação não os informa.
const DEFAULT_EVENTS: [&str; 2] = ["lead.created", "lead.updated"];

// Entropia dos identificadores gerados na criação do endpoint.
const URL_TOKEN_BYTES: usize = 24;
const SECRET_BYTES: usize = 32;

/// O desfecho de uma entrega: status e corpo que voltam ao remetente.
/// O mesmo corpo vai para o WebhookLog, então o que o log registra é
/// exatamente o que o chamador recebeu.
#[derive(Debug)]
pub struct IngestOutcome {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Clone)]
pub struct WebhookService {
    webhook_repo: WebhookRepository,
    lead_repo: LeadRepository,
    workspace_repo: WorkspaceRepository,
    activity: ActivityService,
    pool: PgPool,
    require_signature: bool,
}

impl WebhookService {
    pub fn new(
        webhook_repo: WebhookRepository,
        lead_repo: LeadRepository,
        workspace_repo: WorkspaceRepository,
        activity: ActivityService,
        pool: PgPool,
        require_signature: bool,
    ) -> Self {
        Self {
            webhook_repo,
            lead_repo,
            workspace_repo,
            activity,
            pool,
            require_signature,
        }
    }

    // =========================================================================
    //  1. REGISTRO DE ENDPOINTS
    // =========================================================================

    /// Cria um endpoint com token de URL e segredo gerados. Os dois são
    /// imutáveis: o token é a chave de despacho das entregas e o segredo
    /// assina o HMAC delas.
    pub async fn create_endpoint(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        payload: CreateWebhookEndpointPayload,
    ) -> Result<WebhookEndpointCreated, AppError> {
        let provider = payload.provider.unwrap_or_else(|| "generic".to_string());
        if transformers::transformer_for(&provider).is_none() {
            return Err(AppError::PayloadInvalid(format!(
                "Provedor desconhecido '{}'. Válidos: {}",
                provider,
                transformers::known_providers().join(", ")
            )));
        }

        let events = payload
            .events
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENTS.iter().map(|s| s.to_string()).collect());

        let url_token = generate_hex_token(URL_TOKEN_BYTES);
        let secret = generate_hex_token(SECRET_BYTES);

        let endpoint = self
            .webhook_repo
            .create_endpoint(
                workspace_id,
                &payload.name,
                &url_token,
                &secret,
                &provider,
                &events,
                Some(actor),
            )
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Created,
                "webhook_endpoint",
                Some(endpoint.id),
                &format!("Endpoint de webhook '{}' criado", endpoint.name),
                json!({ "provider": endpoint.provider }),
            )
            .await;

        let delivery_path = format!("/api/hooks/{}", endpoint.url_token);
        let secret = endpoint.secret.clone();

        Ok(WebhookEndpointCreated {
            endpoint,
            secret,
            delivery_path,
        })
    }

    pub async fn list_endpoints(&self, workspace_id: Uuid) -> Result<Vec<WebhookEndpoint>, AppError> {
        self.webhook_repo.list_endpoints(workspace_id).await
    }

    pub async fn update_endpoint(
        &self,
        workspace_id: Uuid,
        endpoint_id: Uuid,
        payload: UpdateWebhookEndpointPayload,
    ) -> Result<WebhookEndpoint, AppError> {
        if let Some(provider) = payload.provider.as_deref() {
            if transformers::transformer_for(provider).is_none() {
                return Err(AppError::PayloadInvalid(format!(
                    "Provedor desconhecido '{}'.",
                    provider
                )));
            }
        }

        self.webhook_repo
            .update_endpoint(
                workspace_id,
                endpoint_id,
                payload.name.as_deref(),
                payload.provider.as_deref(),
                payload.events.as_deref(),
                payload.is_active,
            )
            .await
    }

    /// Desativa o endpoint (flag, não exclusão). Os logs permanecem.
    pub async fn deactivate_endpoint(
        &self,
        workspace_id: Uuid,
        endpoint_id: Uuid,
        actor: Uuid,
    ) -> Result<WebhookEndpoint, AppError> {
        let endpoint = self
            .webhook_repo
            .deactivate(workspace_id, endpoint_id)
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Updated,
                "webhook_endpoint",
                Some(endpoint.id),
                &format!("Endpoint de webhook '{}' desativado", endpoint.name),
                json!({}),
            )
            .await;

        Ok(endpoint)
    }

    pub async fn list_logs(
        &self,
        workspace_id: Uuid,
        endpoint_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<WebhookLog>, AppError> {
        // Garante que o endpoint pertence ao workspace do chamador
        self.webhook_repo
            .find_endpoint(workspace_id, endpoint_id)
            .await?
            .ok_or(AppError::WebhookEndpointNotFound)?;

        let limit = limit.unwrap_or(50).clamp(1, 200);
        self.webhook_repo.list_logs(endpoint_id, limit).await
    }

    // =========================================================================
    //  2. PIPELINE DE INGESTÃO
    // =========================================================================
    //
    //  Recebida -> Endpoint resolvido -> Assinatura verificada ->
    //  Payload transformado -> Lead persistido -> Log de sucesso,
    //  com escape para log de falha a partir de qualquer etapa após a
    //  resolução do endpoint.

    /// Processa uma entrega de entrada. Nunca propaga pânico ou erro cru
    /// para a camada HTTP: toda falha vira um desfecho estruturado, e toda
    /// tentativa com endpoint resolvido deixa exatamente um WebhookLog.
    pub async fn ingest(
        &self,
        url_token: &str,
        signature: Option<&str>,
        raw_body: &[u8],
    ) -> IngestOutcome {
        // 1. Resolve o endpoint. Sem endpoint não há onde pendurar um log;
        //    a falha fica registrada apenas no canal operacional.
        let endpoint = match self.webhook_repo.find_active_by_token(url_token).await {
            Ok(Some(endpoint)) => endpoint,
            Ok(None) => {
                tracing::warn!("Entrega de webhook para token desconhecido ou inativo");
                return failure_outcome(&AppError::WebhookEndpointNotFound);
            }
            Err(err) => {
                tracing::error!("Falha ao resolver endpoint de webhook: {}", err);
                return failure_outcome(&err);
            }
        };

        let request_id = Uuid::new_v4();

        // Snapshot do payload para o log, mesmo quando o corpo nem é JSON.
        let payload_snapshot: Value = serde_json::from_slice(raw_body)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw_body).into_owned()));

        match self.process_delivery(&endpoint, signature, raw_body).await {
            Ok(lead_id) => {
                let outcome = IngestOutcome {
                    status: StatusCode::OK,
                    body: json!({
                        "success": true,
                        "lead_id": lead_id,
                        "message": "Lead criado com sucesso"
                    }),
                };

                self.write_log(&endpoint, request_id, &payload_snapshot, &outcome, None)
                    .await;

                self.activity
                    .record(
                        endpoint.workspace_id,
                        None,
                        ActivityType::Created,
                        "lead",
                        Some(lead_id),
                        "Lead criado via webhook",
                        json!({
                            "activitySubType": "created_via_webhook",
                            "webhookEndpointId": endpoint.id,
                            "source": endpoint.provider,
                            "requestId": request_id,
                        }),
                    )
                    .await;

                outcome
            }
            Err(err) => {
                let outcome = failure_outcome(&err);
                self.write_log(
                    &endpoint,
                    request_id,
                    &payload_snapshot,
                    &outcome,
                    Some(&error_detail(&err)),
                )
                .await;
                outcome
            }
        }
    }

    /// As etapas 2-4 do pipeline: verificação de assinatura, transformação
    /// e persistência. Qualquer erro daqui vira log de falha no chamador.
    async fn process_delivery(
        &self,
        endpoint: &WebhookEndpoint,
        signature: Option<&str>,
        raw_body: &[u8],
    ) -> Result<Uuid, AppError> {
        // 2. Assinatura: exigida pela configuração ou verificada quando veio.
        match signature {
            Some(header) => verify_signature(&endpoint.secret, raw_body, header)?,
            None if self.require_signature => return Err(AppError::SignatureMissing),
            None => {}
        }

        // 3. Transforma o payload no rascunho canônico de lead.
        let payload: Value = serde_json::from_slice(raw_body)
            .map_err(|e| AppError::PayloadInvalid(format!("JSON inválido: {}", e)))?;

        let transformer = transformers::transformer_for(&endpoint.provider).ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!(
                "endpoint {} com provedor desconhecido '{}'",
                endpoint.id,
                endpoint.provider
            ))
        })?;

        let draft = transformer.transform(&payload)?;

        // 4. Persiste o lead no workspace do endpoint, com o status do
        //    payload ou o padrão do workspace.
        let workspace = self
            .workspace_repo
            .find_workspace(endpoint.workspace_id)
            .await?
            .ok_or(AppError::WorkspaceNotFound)?;

        let status = draft
            .status
            .clone()
            .unwrap_or(workspace.default_lead_status);

        let lead = self
            .lead_repo
            .create_lead(&self.pool, endpoint.workspace_id, &draft, &status, None)
            .await?;

        Ok(lead.id)
    }

    /// 5. Grava o WebhookLog da tentativa. Melhor esforço: se a gravação do
    /// log falhar não há mais o que desfazer, então o erro vai para o canal
    /// operacional.
    async fn write_log(
        &self,
        endpoint: &WebhookEndpoint,
        request_id: Uuid,
        payload: &Value,
        outcome: &IngestOutcome,
        error_message: Option<&str>,
    ) {
        let result = self
            .webhook_repo
            .insert_log(
                endpoint.id,
                request_id,
                "lead.created",
                payload,
                outcome.status.as_u16() as i32,
                Some(&outcome.body),
                error_message,
            )
            .await;

        if let Err(err) = result {
            tracing::error!(
                "Falha ao gravar WebhookLog do endpoint {} (request {}): {}",
                endpoint.id,
                request_id,
                err
            );
        }
    }
}

fn failure_outcome(err: &AppError) -> IngestOutcome {
    IngestOutcome {
        status: err.webhook_status(),
        body: json!({ "success": false, "error": err.to_string() }),
    }
}

/// A mensagem da exceção como foi levantada, sem resumo, para o campo
/// error_message do log.
fn error_detail(err: &AppError) -> String {
    match err {
        AppError::DatabaseError(inner) => inner.to_string(),
        AppError::InternalServerError(inner) => format!("{:#}", inner),
        other => other.to_string(),
    }
}

/// Verifica o cabeçalho `X-Webhook-Signature: sha256=<hex>` contra o HMAC
/// do corpo bruto. `verify_slice` compara em tempo constante.
fn verify_signature(secret: &str, body: &[u8], header: &str) -> Result<(), AppError> {
    let hex_signature = header
        .strip_prefix("sha256=")
        .ok_or(AppError::SignatureMismatch)?;

    let signature_bytes = hex::decode(hex_signature).map_err(|_| AppError::SignatureMismatch)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::InternalServerError(anyhow::anyhow!("segredo HMAC inválido")))?;
    mac.update(body);

    mac.verify_slice(&signature_bytes)
        .map_err(|_| AppError::SignatureMismatch)
}

/// Token aleatório em hexadecimal, usado para a URL e o segredo do endpoint.
fn generate_hex_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn assinatura_valida_passa() {
        let body = br#"{"name":"Jane"}"#;
        let header = sign("segredo", body);
        assert!(verify_signature("segredo", body, &header).is_ok());
    }

    #[test]
    fn assinatura_de_outro_segredo_falha() {
        let body = br#"{"name":"Jane"}"#;
        let header = sign("outro-segredo", body);
        assert!(matches!(
            verify_signature("segredo", body, &header),
            Err(AppError::SignatureMismatch)
        ));
    }

    #[test]
    fn corpo_adulterado_falha() {
        let header = sign("segredo", br#"{"value":100}"#);
        assert!(matches!(
            verify_signature("segredo", br#"{"value":999}"#, &header),
            Err(AppError::SignatureMismatch)
        ));
    }

    #[test]
    fn cabecalho_sem_prefixo_ou_fora_do_hex_falha() {
        let body = b"x";
        assert!(verify_signature("s", body, "abcdef").is_err());
        assert!(verify_signature("s", body, "sha256=zzzz").is_err());
    }

    #[test]
    fn tokens_gerados_tem_entropia_e_tamanho_esperados() {
        let a = generate_hex_token(URL_TOKEN_BYTES);
        let b = generate_hex_token(URL_TOKEN_BYTES);
        assert_eq!(a.len(), URL_TOKEN_BYTES * 2);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));

        let secret = generate_hex_token(SECRET_BYTES);
        assert_eq!(secret.len(), SECRET_BYTES * 2);
    }
}
