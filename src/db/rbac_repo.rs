// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::rbac::Role;

#[derive(Clone)]
pub struct RoleRepository {
    pool: PgPool,
}

impl RoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        name: &str,
        description: Option<&str>,
        permissions: &[String],
        is_default: bool,
        is_system: bool,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (workspace_id, name, description, permissions, is_default, is_system)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(workspace_id)
        .bind(name)
        .bind(description)
        .bind(permissions)
        .bind(is_default)
        .bind(is_system)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(format!(
                        "Já existe um cargo com o nome '{}' neste workspace.",
                        name
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id(&self, role_id: Uuid) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(role_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(role)
    }

    pub async fn find_in_workspace(
        &self,
        workspace_id: Uuid,
        role_id: Uuid,
    ) -> Result<Option<Role>, AppError> {
        let role =
            sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE workspace_id = $1 AND id = $2")
                .bind(workspace_id)
                .bind(role_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(role)
    }

    pub async fn list_by_workspace(&self, workspace_id: Uuid) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE workspace_id = $1 ORDER BY is_system DESC, name ASC",
        )
        .bind(workspace_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// O cargo padrão do workspace, destino dos membros órfãos quando um
    /// cargo customizado é apagado.
    pub async fn find_default<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE workspace_id = $1 AND is_default = TRUE LIMIT 1",
        )
        .bind(workspace_id)
        .fetch_optional(executor)
        .await?;

        Ok(role)
    }

    /// Repassa os membros de um cargo para outro. Usado na exclusão de cargo,
    /// dentro da mesma transação que o DELETE.
    pub async fn reassign_members<'e, E>(
        &self,
        executor: E,
        from_role_id: Uuid,
        to_role_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE workspace_members SET role_id = $2, updated_at = NOW() WHERE role_id = $1",
        )
        .bind(from_role_id)
        .bind(to_role_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_role<'e, E>(
        &self,
        executor: E,
        workspace_id: Uuid,
        role_id: Uuid,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM roles WHERE workspace_id = $1 AND id = $2")
            .bind(workspace_id)
            .bind(role_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
