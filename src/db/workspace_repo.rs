// src/db/workspace_repo.rs

use chrono::Utc;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::workspace::{MemberStatus, Workspace, WorkspaceMember};

#[derive(Clone)]
pub struct WorkspaceRepository {
    pool: PgPool,
}

impl WorkspaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_workspace<'e, E>(
        &self,
        executor: E,
        name: &str,
        slug: &str,
    ) -> Result<Workspace, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name, slug)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(slug)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "Já existe um workspace com o slug '{}'.",
                        slug
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn find_workspace(&self, workspace_id: Uuid) -> Result<Option<Workspace>, AppError> {
        let workspace = sqlx::query_as::<_, Workspace>("SELECT * FROM workspaces WHERE id = $1")
            .bind(workspace_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(workspace)
    }

    /// Lista os workspaces em que o usuário tem vínculo ativo.
    pub async fn list_workspaces_for_user(&self, user_id: Uuid) -> Result<Vec<Workspace>, AppError> {
        let workspaces = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT w.*
            FROM workspaces w
            INNER JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1 AND m.status = 'active'
            ORDER BY w.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(workspaces)
    }

    /// Verifica se um usuário tem vínculo ativo com um workspace.
    /// Esta é a primeira barreira de autorização de toda rota escopada.
    pub async fn check_active_membership(
        &self,
        user_id: Uuid,
        workspace_id: Uuid,
    ) -> Result<bool, AppError> {
        // SELECT EXISTS para a consulta mais rápida possível.
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM workspace_members
                WHERE user_id = $1 AND workspace_id = $2 AND status = 'active'
            )
            "#,
        )
        .bind(user_id)
        .bind(workspace_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    pub async fn get_membership(
        &self,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AppError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(
            "SELECT * FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    pub async fn get_membership_by_id(
        &self,
        workspace_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<WorkspaceMember>, AppError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(
            "SELECT * FROM workspace_members WHERE workspace_id = $1 AND id = $2",
        )
        .bind(workspace_id)
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(member)
    }

    /// Cria o vínculo usuário-workspace. O par é único: inserção duplicada
    /// é conflito (409), nunca sobrescrita.
    pub async fn create_membership<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        user_id: Uuid,
        role_id: Uuid,
        status: MemberStatus,
        invited_by: Option<Uuid>,
    ) -> Result<WorkspaceMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let joined_at = match status {
            MemberStatus::Active => Some(Utc::now()),
            _ => None,
        };

        sqlx::query_as::<_, WorkspaceMember>(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role_id, status, invited_by, joined_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .bind(role_id)
        .bind(status)
        .bind(invited_by)
        .bind(joined_at)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este usuário já é membro do workspace.".into(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn update_member_status(
        &self,
        workspace_id: Uuid,
        member_id: Uuid,
        status: MemberStatus,
    ) -> Result<WorkspaceMember, AppError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(
            r#"
            UPDATE workspace_members
            SET status = $3,
                joined_at = CASE WHEN $3 = 'active'::member_status THEN COALESCE(joined_at, NOW()) ELSE joined_at END,
                updated_at = NOW()
            WHERE workspace_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(member_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await?;

        member.ok_or(AppError::MembershipNotFound)
    }

    pub async fn update_member_role(
        &self,
        workspace_id: Uuid,
        member_id: Uuid,
        role_id: Uuid,
    ) -> Result<WorkspaceMember, AppError> {
        let member = sqlx::query_as::<_, WorkspaceMember>(
            r#"
            UPDATE workspace_members
            SET role_id = $3, updated_at = NOW()
            WHERE workspace_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(member_id)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;

        member.ok_or(AppError::MembershipNotFound)
    }

    pub async fn list_members(&self, workspace_id: Uuid) -> Result<Vec<WorkspaceMember>, AppError> {
        let members = sqlx::query_as::<_, WorkspaceMember>(
            "SELECT * FROM workspace_members WHERE workspace_id = $1 ORDER BY created_at ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(members)
    }
}
