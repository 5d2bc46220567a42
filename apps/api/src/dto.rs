use pragmadic_application::RoleAssignment;
use pragmadic_core::UserIdentity;
use pragmadic_domain::{Permission, Role};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<UserIdentity> for UserIdentityResponse {
    fn from(value: UserIdentity) -> Self {
        Self {
            user_id: value.user_id().to_string(),
            display_name: value.display_name().to_owned(),
            email: value.email().map(ToOwned::to_owned),
        }
    }
}

/// Caller's roles and effective permission strings.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/effective-permissions-response.ts"
)]
pub struct EffectivePermissionsResponse {
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
}

impl EffectivePermissionsResponse {
    /// Builds the payload from resolved role and permission sets.
    #[must_use]
    pub fn new(
        roles: impl IntoIterator<Item = Role>,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        Self {
            roles: roles.into_iter().map(|role| role.as_str().to_owned()).collect(),
            permissions: permissions
                .into_iter()
                .map(|permission| permission.as_str().to_owned())
                .collect(),
        }
    }
}

/// API representation of one user-to-role assignment row.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-assignment-response.ts"
)]
pub struct RoleAssignmentResponse {
    pub user_id: String,
    pub role: String,
    pub assigned_at: String,
}

impl From<RoleAssignment> for RoleAssignmentResponse {
    fn from(value: RoleAssignment) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            role: value.role.as_str().to_owned(),
            assigned_at: value.assigned_at,
        }
    }
}

/// API representation of a user's current role set.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-roles-response.ts"
)]
pub struct UserRolesResponse {
    pub user_id: String,
    pub roles: Vec<String>,
}

/// Incoming payload replacing a user's full role set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/replace-roles-request.ts"
)]
pub struct ReplaceRolesRequest {
    pub roles: Vec<String>,
}

/// Incoming payload appending one role to a user.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/add-role-request.ts"
)]
pub struct AddRoleRequest {
    pub role: String,
}
