// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::workspace::WorkspaceContext,
    models::auth::CurrentUser,
    models::rbac::{Action, Resource},
};

/// 1. O Trait que define o que é uma Permissão exigida por uma rota
pub trait PermissionDef: Send + Sync + 'static {
    fn resource() -> Resource;
    fn action() -> Action;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)?;

        // B. Extrai Workspace
        let workspace = parts
            .extensions
            .get::<WorkspaceContext>()
            .copied()
            .ok_or_else(|| {
                AppError::PayloadInvalid("Contexto do workspace não encontrado.".into())
            })?;

        // C. Verifica no banco: status do vínculo + permissões do cargo
        app_state
            .rbac_service
            .authorize(user.id, workspace.0, T::resource(), T::action())
            .await?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission_def {
    ($name:ident, $resource:ident, $action:ident) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn resource() -> Resource {
                Resource::$resource
            }
            fn action() -> Action {
                Action::$action
            }
        }
    };
}

permission_def!(PermLeadsCreate, Leads, Create);
permission_def!(PermLeadsRead, Leads, Read);
permission_def!(PermLeadsUpdate, Leads, Update);
permission_def!(PermLeadsDelete, Leads, Delete);
permission_def!(PermLeadsAssign, Leads, Assign);

permission_def!(PermWebhooksCreate, Webhooks, Create);
permission_def!(PermWebhooksRead, Webhooks, Read);
permission_def!(PermWebhooksUpdate, Webhooks, Update);
permission_def!(PermWebhooksDelete, Webhooks, Delete);

permission_def!(PermRolesCreate, Roles, Create);
permission_def!(PermRolesRead, Roles, Read);
permission_def!(PermRolesDelete, Roles, Delete);

permission_def!(PermMembersCreate, Members, Create);
permission_def!(PermMembersRead, Members, Read);
permission_def!(PermMembersUpdate, Members, Update);

permission_def!(PermActivitiesRead, Activities, Read);
