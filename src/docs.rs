// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Workspaces ---
        handlers::workspaces::create_workspace,
        handlers::workspaces::list_my_workspaces,

        // --- Leads ---
        handlers::leads::create_lead,
        handlers::leads::list_leads,
        handlers::leads::update_lead_status,
        handlers::leads::assign_lead,
        handlers::leads::delete_lead,

        // --- Webhooks ---
        handlers::webhooks::create_webhook,
        handlers::webhooks::list_webhooks,
        handlers::webhooks::update_webhook,
        handlers::webhooks::deactivate_webhook,
        handlers::webhooks::list_webhook_logs,
        handlers::webhooks::receive_delivery,
    ),
    components(
        schemas(
            // --- Workspaces ---
            models::workspace::Workspace,
            models::workspace::MemberStatus,
            models::workspace::WorkspaceMember,
            models::workspace::CreateWorkspacePayload,
            models::workspace::CreateMemberPayload,
            models::workspace::UpdateMemberStatusPayload,
            models::workspace::UpdateMemberRolePayload,

            // --- RBAC ---
            models::rbac::Role,
            models::rbac::CreateRolePayload,
            models::rbac::PermissionDescriptor,

            // --- Leads ---
            models::lead::Lead,
            models::lead::CreateLeadPayload,
            models::lead::UpdateLeadStatusPayload,
            models::lead::AssignLeadPayload,

            // --- Webhooks ---
            models::webhook::WebhookEndpoint,
            models::webhook::WebhookEndpointCreated,
            models::webhook::WebhookLog,
            models::webhook::CreateWebhookEndpointPayload,
            models::webhook::UpdateWebhookEndpointPayload,

            // --- Atividades ---
            models::activity::Activity,
            models::activity::ActivityType,
        )
    ),
    tags(
        (name = "Workspaces", description = "Gestão de Workspaces e Acesso"),
        (name = "Leads", description = "Gestão de Leads do Funil"),
        (name = "Webhooks", description = "Endpoints de Webhook e Entregas"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
