// src/middleware/workspace.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState};

// O nome do nosso cabeçalho HTTP customizado
const WORKSPACE_ID_HEADER: &str = "x-workspace-id";

// O contexto do workspace que o usuário quer acessar nesta requisição.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceContext(pub Uuid);

/// Guard das rotas escopadas por workspace: autentica o usuário, valida o
/// cabeçalho X-Workspace-Id e exige vínculo ativo com o workspace.
/// A permissão fina de cada rota fica com o extrator RequirePermission.
pub async fn workspace_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Autentica (este guard também cobre a autenticação)
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(token)?;

    // 2. Lê e valida o cabeçalho do workspace
    let header_value = request
        .headers()
        .get(WORKSPACE_ID_HEADER)
        .ok_or_else(|| AppError::PayloadInvalid("O cabeçalho X-Workspace-Id é obrigatório.".into()))?;

    let value_str = header_value.to_str().map_err(|_| {
        AppError::PayloadInvalid("Cabeçalho X-Workspace-Id contém caracteres inválidos.".into())
    })?;

    let workspace_id = Uuid::parse_str(value_str).map_err(|_| {
        AppError::PayloadInvalid("Cabeçalho X-Workspace-Id inválido (não é um UUID).".into())
    })?;

    // 3. Só membros ativos passam; o status bloqueia antes de qualquer cargo
    let is_member = app_state
        .workspace_repo
        .check_active_membership(user.id, workspace_id)
        .await?;

    if !is_member {
        return Err(AppError::Forbidden(
            "Você não tem acesso a este workspace.".into(),
        ));
    }

    request.extensions_mut().insert(user);
    request.extensions_mut().insert(WorkspaceContext(workspace_id));

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for WorkspaceContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<WorkspaceContext>()
            .copied()
            .ok_or_else(|| {
                AppError::PayloadInvalid("Contexto do workspace não encontrado.".into())
            })
    }
}
