use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use pragmadic_application::{RoleAssignment, RoleAssignmentRepository};
use pragmadic_core::{AppError, AppResult, UserId};
use pragmadic_domain::Role;

#[cfg(test)]
mod tests;

/// PostgreSQL-backed repository for user role assignments.
#[derive(Clone)]
pub struct PostgresRoleAssignmentRepository {
    pool: PgPool,
}

impl PostgresRoleAssignmentRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role: String,
}

#[derive(Debug, FromRow)]
struct RoleAssignmentRow {
    user_id: uuid::Uuid,
    role: String,
    assigned_at: String,
}

#[async_trait]
impl RoleAssignmentRepository for PostgresRoleAssignmentRepository {
    async fn get_roles(&self, user_id: UserId) -> AppResult<BTreeSet<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT role
            FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load roles: {error}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| decode_stored_role(row.role.as_str(), user_id))
            .collect())
    }

    async fn set_roles(&self, user_id: UserId, roles: BTreeSet<Role>) -> AppResult<()> {
        // Delete-then-insert inside one transaction: a concurrent reader
        // never observes the intermediate empty role set.
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            DELETE FROM user_roles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to clear roles: {error}")))?;

        for role in &roles {
            sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role)
                VALUES ($1, $2)
                ON CONFLICT (user_id, role) DO NOTHING
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(role.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to persist role: {error}")))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    async fn add_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to add role: {error}")))?;

        Ok(())
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        let rows = sqlx::query_as::<_, RoleAssignmentRow>(
            r#"
            SELECT
                user_id,
                role,
                to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS assigned_at
            FROM user_roles
            ORDER BY user_id, role
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role assignments: {error}")))?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let user_id = UserId::from_uuid(row.user_id);
                decode_stored_role(row.role.as_str(), user_id).map(|role| RoleAssignment {
                    user_id,
                    role,
                    assigned_at: row.assigned_at,
                })
            })
            .collect())
    }
}

/// Decodes a stored role value, failing closed on unrecognized entries.
fn decode_stored_role(value: &str, user_id: UserId) -> Option<Role> {
    match Role::from_str(value) {
        Ok(role) => Some(role),
        Err(_) => {
            tracing::warn!(%user_id, role = value, "skipping unrecognized stored role");
            None
        }
    }
}
