pub mod activity_service;
pub use activity_service::ActivityService;
pub mod auth;
pub use auth::AuthService;
pub mod lead_service;
pub use lead_service::LeadService;
pub mod rbac_service;
pub use rbac_service::RbacService;
pub mod transformers;
pub mod webhook_service;
pub use webhook_service::WebhookService;
pub mod workspace_service;
pub use workspace_service::WorkspaceService;
