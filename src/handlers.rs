pub mod activities;
pub mod leads;
pub mod rbac;
pub mod webhooks;
pub mod workspaces;
