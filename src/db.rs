pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod lead_repo;
pub use lead_repo::LeadRepository;
pub mod rbac_repo;
pub use rbac_repo::RoleRepository;
pub mod webhook_repo;
pub use webhook_repo::WebhookRepository;
pub mod workspace_repo;
pub use workspace_repo::WorkspaceRepository;
