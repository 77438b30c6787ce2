// src/services/workspace_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RoleRepository, WorkspaceRepository},
    models::activity::ActivityType,
    models::workspace::{MemberStatus, Workspace, WorkspaceMember},
    services::{activity_service::ActivityService, rbac_service::RbacService},
};

#[derive(Clone)]
pub struct WorkspaceService {
    workspace_repo: WorkspaceRepository,
    role_repo: RoleRepository,
    rbac_service: RbacService,
    activity: ActivityService,
    pool: PgPool,
}

impl WorkspaceService {
    pub fn new(
        workspace_repo: WorkspaceRepository,
        role_repo: RoleRepository,
        rbac_service: RbacService,
        activity: ActivityService,
        pool: PgPool,
    ) -> Self {
        Self {
            workspace_repo,
            role_repo,
            rbac_service,
            activity,
            pool,
        }
    }

    // =========================================================================
    //  1. WORKSPACES
    // =========================================================================

    /// Cria um novo workspace e, atomicamente, os cargos de sistema e o
    /// vínculo do criador como dono ativo.
    pub async fn create_workspace_with_owner(
        &self,
        name: &str,
        slug: Option<&str>,
        owner_id: Uuid,
    ) -> Result<Workspace, AppError> {
        let slug = match slug {
            Some(s) => s.to_string(),
            None => slugify(name),
        };

        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o workspace
        let workspace = self
            .workspace_repo
            .create_workspace(&mut *tx, name, &slug)
            .await?;

        // 3. Cria os cargos de sistema (Dono, Administrador, Membro, Visualizador)
        let owner_role = self
            .rbac_service
            .bootstrap_system_roles(&mut tx, workspace.id)
            .await?;

        // 4. Vincula o criador como dono, já ativo
        self.workspace_repo
            .create_membership(
                &mut *tx,
                workspace.id,
                owner_id,
                owner_role.id,
                MemberStatus::Active,
                None,
            )
            .await?;

        // 5. Commit
        tx.commit().await?;

        self.activity
            .record(
                workspace.id,
                Some(owner_id),
                ActivityType::Created,
                "workspace",
                Some(workspace.id),
                &format!("Workspace '{}' criado", workspace.name),
                json!({ "slug": workspace.slug }),
            )
            .await;

        Ok(workspace)
    }

    pub async fn list_user_workspaces(&self, user_id: Uuid) -> Result<Vec<Workspace>, AppError> {
        self.workspace_repo.list_workspaces_for_user(user_id).await
    }

    // =========================================================================
    //  2. MEMBROS
    // =========================================================================

    /// Cria o vínculo de um usuário com o workspace. O par (workspace, user)
    /// é único: repetir é conflito, nunca sobrescrita.
    pub async fn create_member(
        &self,
        workspace_id: Uuid,
        actor: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        status: Option<MemberStatus>,
    ) -> Result<WorkspaceMember, AppError> {
        // O cargo precisa existir neste workspace
        let role = self
            .role_repo
            .find_in_workspace(workspace_id, role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        let status = status.unwrap_or(MemberStatus::Pending);

        let member = self
            .workspace_repo
            .create_membership(&self.pool, workspace_id, user_id, role.id, status, Some(actor))
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::Created,
                "member",
                Some(member.id),
                "Membro adicionado ao workspace",
                json!({ "userId": user_id, "roleId": role.id, "status": status }),
            )
            .await;

        Ok(member)
    }

    pub async fn get_membership(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<WorkspaceMember, AppError> {
        self.workspace_repo
            .get_membership(workspace_id, user_id)
            .await?
            .ok_or(AppError::MembershipNotFound)
    }

    pub async fn list_members(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, AppError> {
        self.workspace_repo.list_members(workspace_id).await
    }

    /// Muda o status do vínculo e registra a transição (valores antigo e novo)
    /// na trilha de atividades.
    pub async fn update_member_status(
        &self,
        workspace_id: Uuid,
        member_id: Uuid,
        new_status: MemberStatus,
        actor: Uuid,
    ) -> Result<WorkspaceMember, AppError> {
        let current = self
            .workspace_repo
            .get_membership_by_id(workspace_id, member_id)
            .await?
            .ok_or(AppError::MembershipNotFound)?;

        let updated = self
            .workspace_repo
            .update_member_status(workspace_id, member_id, new_status)
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::StatusChanged,
                "member",
                Some(member_id),
                "Status do membro alterado",
                json!({ "oldStatus": current.status, "newStatus": updated.status }),
            )
            .await;

        Ok(updated)
    }

    /// Troca o cargo do membro, com o mesmo registro de transição.
    pub async fn update_member_role(
        &self,
        workspace_id: Uuid,
        member_id: Uuid,
        new_role_id: Uuid,
        actor: Uuid,
    ) -> Result<WorkspaceMember, AppError> {
        let current = self
            .workspace_repo
            .get_membership_by_id(workspace_id, member_id)
            .await?
            .ok_or(AppError::MembershipNotFound)?;

        let role = self
            .role_repo
            .find_in_workspace(workspace_id, new_role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        let updated = self
            .workspace_repo
            .update_member_role(workspace_id, member_id, role.id)
            .await?;

        self.activity
            .record(
                workspace_id,
                Some(actor),
                ActivityType::RoleChanged,
                "member",
                Some(member_id),
                "Cargo do membro alterado",
                json!({ "oldRoleId": current.role_id, "newRoleId": updated.role_id }),
            )
            .await;

        Ok(updated)
    }
}

/// Deriva um slug de URL a partir do nome do workspace.
fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_normaliza_o_nome() {
        assert_eq!(slugify("Imobiliária Horizonte"), "imobili-ria-horizonte");
        assert_eq!(slugify("  ACME  Corp  "), "acme-corp");
        assert_eq!(slugify("abc"), "abc");
    }
}
