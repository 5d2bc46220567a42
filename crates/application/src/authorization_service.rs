use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use pragmadic_core::{AppError, AppResult, UserId};
use pragmadic_domain::{Permission, Role, caller_has_permission, effective_permissions};

/// Assignment projection mapping a user to a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleAssignment {
    /// User identifier.
    pub user_id: UserId,
    /// Assigned role.
    pub role: Role,
    /// Assignment timestamp in RFC3339.
    pub assigned_at: String,
}

/// Repository port for the durable user-to-roles mapping.
///
/// One row per `(user_id, role)` pair. A user without rows holds no roles;
/// the default role is assigned explicitly at onboarding, never implied at
/// query time.
#[async_trait]
pub trait RoleAssignmentRepository: Send + Sync {
    /// Returns the roles currently assigned to a user; empty when none.
    async fn get_roles(&self, user_id: UserId) -> AppResult<BTreeSet<Role>>;

    /// Replaces the entire role set for a user as one logical operation.
    ///
    /// Implementations must not expose a transient empty role set to
    /// concurrent readers.
    async fn set_roles(&self, user_id: UserId, roles: BTreeSet<Role>) -> AppResult<()>;

    /// Appends a role to a user's existing set. Idempotent.
    async fn add_role(&self, user_id: UserId, role: Role) -> AppResult<()>;

    /// Lists all current role assignments.
    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>>;
}

/// Application service answering authorization questions for one caller.
///
/// This is the single choke point mutation paths consult before touching
/// data. A repository failure propagates as an error, so the caller is
/// denied rather than implicitly allowed.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn RoleAssignmentRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleAssignmentRepository>) -> Self {
        Self { repository }
    }

    /// Returns the roles currently held by a user.
    pub async fn roles_for_user(&self, user_id: UserId) -> AppResult<BTreeSet<Role>> {
        self.repository.get_roles(user_id).await
    }

    /// Returns the union of permissions across all roles a user holds.
    pub async fn effective_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> AppResult<BTreeSet<Permission>> {
        let roles = self.repository.get_roles(user_id).await?;
        Ok(effective_permissions(&roles))
    }

    /// Returns whether the user currently has the permission.
    pub async fn has_permission(
        &self,
        user_id: UserId,
        permission: Permission,
    ) -> AppResult<bool> {
        let roles = self.repository.get_roles(user_id).await?;
        Ok(caller_has_permission(&roles, permission))
    }

    /// Ensures the user has the required permission.
    pub async fn require_permission(
        &self,
        user_id: UserId,
        permission: Permission,
    ) -> AppResult<()> {
        if self.has_permission(user_id, permission).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' is missing permission '{}'",
            permission.as_str()
        )))
    }

    /// Ensures the user holds the given role.
    ///
    /// Coarse role-membership gate used for the admin path area, layered in
    /// front of the per-operation permission checks rather than replacing
    /// them.
    pub async fn require_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        let roles = self.repository.get_roles(user_id).await?;
        if roles.contains(&role) {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "user '{user_id}' does not hold role '{}'",
            role.as_str()
        )))
    }
}
