// src/services/rbac_service.rs

use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RoleRepository, WorkspaceRepository},
    models::activity::ActivityType,
    models::rbac::{
        membership_allows, permission_catalog, Action, PermissionDescriptor, PermissionSet, Resource,
        Role,
    },
    services::activity_service::ActivityService,
};

// Cargos de sistema criados em todo workspace novo. O último é o cargo
// padrão, destino dos membros quando um cargo customizado é apagado.
const SYSTEM_ROLES: [(&str, &str, &[&str], bool); 4] = [
    ("Dono", "Acesso total ao workspace", &["*:*"], false),
    (
        "Administrador",
        "Gerencia membros, cargos, leads e webhooks",
        &[
            "workspaces:read",
            "members:*",
            "roles:*",
            "leads:*",
            "webhooks:*",
            "activities:read",
        ],
        false,
    ),
    (
        "Membro",
        "Trabalha os leads do dia a dia",
        &[
            "leads:create",
            "leads:read",
            "leads:update",
            "leads:assign",
            "activities:read",
        ],
        false,
    ),
    (
        "Visualizador",
        "Apenas leitura",
        &["leads:read", "activities:read"],
        true,
    ),
];

#[derive(Clone)]
pub struct RbacService {
    role_repo: RoleRepository,
    workspace_repo: WorkspaceRepository,
    activity: ActivityService,
    pool: PgPool,
}

impl RbacService {
    pub fn new(
        role_repo: RoleRepository,
        workspace_repo: WorkspaceRepository,
        activity: ActivityService,
        pool: PgPool,
    ) -> Self {
        Self {
            role_repo,
            workspace_repo,
            activity,
            pool,
        }
    }

    // =========================================================================
    //  1. AUTORIZAÇÃO
    // =========================================================================

    /// A verificação central de toda rota mutante: status do vínculo primeiro
    /// (somente `active` autoriza), depois o conjunto de permissões do cargo.
    /// Um cargo que não resolve mais (apagado fora do fluxo normal) nega por
    /// padrão em vez de quebrar a requisição.
    pub async fn authorize(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
        resource: Resource,
        action: Action,
    ) -> Result<(), AppError> {
        let membership = self
            .workspace_repo
            .get_membership(workspace_id, user_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Você não é membro deste workspace.".into()))?;

        let permissions = match membership.role_id {
            Some(role_id) => self
                .role_repo
                .find_by_id(role_id)
                .await?
                .map(|role| PermissionSet::from_stored(&role.permissions)),
            None => None,
        };

        if membership_allows(membership.status, permissions.as_ref(), resource, action) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{}:{}' para realizar esta ação.",
                resource.as_str(),
                action.as_str()
            )))
        }
    }

    // =========================================================================
    //  2. CARGOS
    // =========================================================================

    pub async fn create_role(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        name: String,
        description: Option<String>,
        permission_slugs: Vec<String>,
    ) -> Result<Role, AppError> {
        // Valida os slugs contra o modelo tipado antes de tocar no banco;
        // o que fica gravado é a forma canônica.
        let permissions = PermissionSet::parse_strict(&permission_slugs)?;
        let canonical = permissions.as_slugs();

        let role = self
            .role_repo
            .create_role(
                &self.pool,
                workspace_id,
                &name,
                description.as_deref(),
                &canonical,
                false,
                false,
            )
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Created,
                "role",
                Some(role.id),
                &format!("Cargo '{}' criado", role.name),
                json!({ "permissions": canonical }),
            )
            .await;

        Ok(role)
    }

    pub async fn list_roles(&self, workspace_id: Uuid) -> Result<Vec<Role>, AppError> {
        self.role_repo.list_by_workspace(workspace_id).await
    }

    /// Apaga um cargo customizado. Os membros que o usavam caem para o cargo
    /// padrão do workspace, na mesma transação do DELETE.
    pub async fn delete_role(
        &self,
        workspace_id: Uuid,
        role_id: Uuid,
        actor: Uuid,
    ) -> Result<(), AppError> {
        let role = self
            .role_repo
            .find_in_workspace(workspace_id, role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        if role.is_system {
            return Err(AppError::Forbidden(
                "Cargos de sistema não podem ser excluídos.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let fallback = self
            .role_repo
            .find_default(&mut *tx, workspace_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("workspace {} sem cargo padrão", workspace_id))?;

        let moved = self
            .role_repo
            .reassign_members(&mut *tx, role.id, fallback.id)
            .await?;

        self.role_repo
            .delete_role(&mut *tx, workspace_id, role.id)
            .await?;

        tx.commit().await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Deleted,
                "role",
                Some(role.id),
                &format!("Cargo '{}' excluído", role.name),
                json!({ "reassignedMembers": moved, "fallbackRoleId": fallback.id }),
            )
            .await;

        Ok(())
    }

    /// Enumera os pares recurso:acao reconhecidos (para a tela de cargos).
    pub fn list_system_permissions(&self) -> Vec<PermissionDescriptor> {
        permission_catalog()
    }

    // =========================================================================
    //  3. BOOTSTRAP DOS CARGOS DE SISTEMA
    // =========================================================================

    /// Cria os cargos de sistema de um workspace recém-criado, dentro da
    /// transação do chamador. Conflito de nome (alguém criou um cargo com o
    /// mesmo nome antes do bootstrap terminar) usa um nome de recuo em vez
    /// de abortar o workspace inteiro. Retorna o cargo de dono.
    pub async fn bootstrap_system_roles(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        workspace_id: Uuid,
    ) -> Result<Role, AppError> {
        let mut owner_role: Option<Role> = None;

        for (name, description, slugs, is_default) in SYSTEM_ROLES {
            let permissions: Vec<String> = slugs.iter().map(|s| s.to_string()).collect();

            let created = match self
                .role_repo
                .create_role(
                    &mut **tx,
                    workspace_id,
                    name,
                    Some(description),
                    &permissions,
                    is_default,
                    true,
                )
                .await
            {
                Ok(role) => role,
                Err(AppError::UniqueConstraintViolation(_)) => {
                    let fallback_name = format!("{} (sistema)", name);
                    self.role_repo
                        .create_role(
                            &mut **tx,
                            workspace_id,
                            &fallback_name,
                            Some(description),
                            &permissions,
                            is_default,
                            true,
                        )
                        .await?
                }
                Err(e) => return Err(e),
            };

            if owner_role.is_none() {
                owner_role = Some(created);
            }
        }

        // SYSTEM_ROLES nunca é vazio; o primeiro é sempre o dono.
        owner_role.ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("bootstrap sem cargos")))
    }
}
