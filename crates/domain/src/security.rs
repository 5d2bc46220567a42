use std::collections::BTreeSet;
use std::str::FromStr;

use pragmadic_core::AppError;
use serde::{Deserialize, Serialize};

/// Permissions enforced by application policy checks.
///
/// The catalog is closed: a string that does not map onto one of these
/// variants is invalid input, never an implicit grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows viewing DE Rantau hub listings.
    HubsView,
    /// Allows creating a hub.
    HubsCreate,
    /// Allows updating an owned hub.
    HubsUpdate,
    /// Allows deleting a hub.
    HubsDelete,
    /// Allows approving a submitted hub.
    HubsApprove,
    /// Allows viewing communities.
    CommunitiesView,
    /// Allows creating a community.
    CommunitiesCreate,
    /// Allows updating a community.
    CommunitiesUpdate,
    /// Allows deleting a community.
    CommunitiesDelete,
    /// Allows posting in a community.
    CommunitiesPostsCreate,
    /// Allows moderating community posts.
    CommunitiesPostsModerate,
    /// Allows viewing DE Rantau regions.
    RegionsView,
    /// Allows managing region records.
    RegionsManage,
    /// Allows viewing user accounts.
    UsersView,
    /// Allows creating user accounts.
    UsersCreate,
    /// Allows managing user role assignments.
    UsersRolesManage,
    /// Allows writing hub reviews.
    ReviewsCreate,
    /// Allows moderating hub reviews.
    ReviewsModerate,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HubsView => "hubs.view",
            Self::HubsCreate => "hubs.create",
            Self::HubsUpdate => "hubs.update",
            Self::HubsDelete => "hubs.delete",
            Self::HubsApprove => "hubs.approve",
            Self::CommunitiesView => "communities.view",
            Self::CommunitiesCreate => "communities.create",
            Self::CommunitiesUpdate => "communities.update",
            Self::CommunitiesDelete => "communities.delete",
            Self::CommunitiesPostsCreate => "communities.posts.create",
            Self::CommunitiesPostsModerate => "communities.posts.moderate",
            Self::RegionsView => "regions.view",
            Self::RegionsManage => "regions.manage",
            Self::UsersView => "users.view",
            Self::UsersCreate => "users.create",
            Self::UsersRolesManage => "users.roles.manage",
            Self::ReviewsCreate => "reviews.create",
            Self::ReviewsModerate => "reviews.moderate",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::HubsView,
            Permission::HubsCreate,
            Permission::HubsUpdate,
            Permission::HubsDelete,
            Permission::HubsApprove,
            Permission::CommunitiesView,
            Permission::CommunitiesCreate,
            Permission::CommunitiesUpdate,
            Permission::CommunitiesDelete,
            Permission::CommunitiesPostsCreate,
            Permission::CommunitiesPostsModerate,
            Permission::RegionsView,
            Permission::RegionsManage,
            Permission::UsersView,
            Permission::UsersCreate,
            Permission::UsersRolesManage,
            Permission::ReviewsCreate,
            Permission::ReviewsModerate,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .find(|permission| permission.as_str() == value)
            .copied()
            .ok_or_else(|| AppError::Validation(format!("unknown permission value '{value}'")))
    }
}

/// Roles assignable to platform users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Default role assigned at onboarding.
    Regular,
    /// Verified DE Rantau digital nomad.
    Nomad,
    /// Hub owner.
    Owner,
    /// Platform administrator.
    Admin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Nomad => "nomad",
            Self::Owner => "owner",
            Self::Admin => "admin",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[Role::Regular, Role::Nomad, Role::Owner, Role::Admin];

        ALL
    }

    /// Returns the permission set granted to this role.
    ///
    /// The mapping is compiled in and read-only. Admin deliberately holds
    /// approval and deletion grants without the corresponding create/update
    /// grants; that asymmetry is part of the observed policy.
    #[must_use]
    pub fn grants(&self) -> &'static [Permission] {
        match self {
            Self::Regular => &[
                Permission::HubsView,
                Permission::CommunitiesView,
                Permission::RegionsView,
                Permission::ReviewsCreate,
            ],
            Self::Nomad => &[
                Permission::HubsView,
                Permission::CommunitiesView,
                Permission::CommunitiesPostsCreate,
                Permission::RegionsView,
                Permission::ReviewsCreate,
            ],
            Self::Owner => &[
                Permission::HubsView,
                Permission::HubsCreate,
                Permission::HubsUpdate,
                Permission::CommunitiesView,
                Permission::CommunitiesCreate,
                Permission::CommunitiesUpdate,
                Permission::CommunitiesPostsCreate,
                Permission::RegionsView,
            ],
            Self::Admin => &[
                Permission::HubsView,
                Permission::HubsDelete,
                Permission::HubsApprove,
                Permission::CommunitiesView,
                Permission::CommunitiesDelete,
                Permission::CommunitiesPostsModerate,
                Permission::RegionsManage,
                Permission::UsersView,
                Permission::UsersRolesManage,
                Permission::ReviewsModerate,
            ],
        }
    }

    /// Parses a transport value into a role.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "regular" => Ok(Self::Regular),
            "nomad" => Ok(Self::Nomad),
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Returns the permission set for a role.
#[must_use]
pub fn permissions_for_role(role: Role) -> BTreeSet<Permission> {
    role.grants().iter().copied().collect()
}

/// Returns the permission set for a role storage value.
///
/// An unrecognized role value yields the empty set: the caller is treated as
/// holding no permissions, never as holding an implicit grant.
#[must_use]
pub fn permissions_for_role_name(value: &str) -> BTreeSet<Permission> {
    Role::from_str(value)
        .map(permissions_for_role)
        .unwrap_or_default()
}

/// Returns whether a role grants a permission.
#[must_use]
pub fn role_has_permission(role: Role, permission: Permission) -> bool {
    role.grants().contains(&permission)
}

/// Returns the union of permission sets across all held roles.
///
/// An empty role set yields the empty permission set, so every downstream
/// check fails closed for callers without a role assignment.
#[must_use]
pub fn effective_permissions(roles: &BTreeSet<Role>) -> BTreeSet<Permission> {
    roles
        .iter()
        .flat_map(|role| role.grants().iter().copied())
        .collect()
}

/// Returns whether any held role grants the permission.
#[must_use]
pub fn caller_has_permission(roles: &BTreeSet<Role>, permission: Permission) -> bool {
    roles.iter().any(|role| role_has_permission(*role, permission))
}

/// Returns the roles that grant a permission.
#[must_use]
pub fn roles_granting(permission: Permission) -> Vec<Role> {
    Role::all()
        .iter()
        .filter(|role| role_has_permission(**role, permission))
        .copied()
        .collect()
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when an administrator replaces a user's role set.
    SecurityRolesReplaced,
    /// Emitted when an administrator appends a role to a user.
    SecurityRoleAdded,
    /// Emitted when a user completes onboarding and receives the default role.
    UserOnboarded,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecurityRolesReplaced => "security.roles.replaced",
            Self::SecurityRoleAdded => "security.role.added",
            Self::UserOnboarded => "user.onboarded",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{
        Permission, Role, caller_has_permission, effective_permissions, permissions_for_role,
        permissions_for_role_name, role_has_permission, roles_granting,
    };

    #[test]
    fn every_granted_permission_is_in_the_catalog() {
        for role in Role::all() {
            for permission in role.grants() {
                assert!(
                    Permission::all().contains(permission),
                    "role '{}' grants a permission outside the catalog",
                    role.as_str()
                );
            }
        }
    }

    #[test]
    fn grants_have_set_semantics() {
        for role in Role::all() {
            let unique: BTreeSet<Permission> = role.grants().iter().copied().collect();
            assert_eq!(unique.len(), role.grants().len());
        }
    }

    #[test]
    fn unknown_role_value_yields_empty_set() {
        assert!(permissions_for_role_name("nonexistent").is_empty());
        assert!(Role::from_str("nonexistent").is_err());
    }

    #[test]
    fn unknown_permission_is_rejected() {
        assert!(Permission::from_str("hubs.unknown").is_err());
    }

    #[test]
    fn effective_permissions_are_the_union_over_roles() {
        let roles = BTreeSet::from([Role::Nomad, Role::Owner]);

        let mut expected = permissions_for_role(Role::Nomad);
        expected.extend(permissions_for_role(Role::Owner));
        assert_eq!(effective_permissions(&roles), expected);

        assert!(caller_has_permission(&roles, Permission::CommunitiesPostsCreate));
        assert!(caller_has_permission(&roles, Permission::HubsCreate));

        let nomad_only = BTreeSet::from([Role::Nomad]);
        assert!(!caller_has_permission(&nomad_only, Permission::HubsCreate));
    }

    #[test]
    fn empty_role_set_has_no_permissions() {
        let roles = BTreeSet::new();
        assert!(effective_permissions(&roles).is_empty());
        assert!(!caller_has_permission(&roles, Permission::HubsView));
    }

    #[test]
    fn admin_lacks_create_and_update_grants() {
        assert!(!role_has_permission(Role::Admin, Permission::HubsCreate));
        assert!(!role_has_permission(Role::Admin, Permission::HubsUpdate));
        assert!(!role_has_permission(Role::Admin, Permission::RegionsView));
        assert!(!role_has_permission(Role::Admin, Permission::UsersCreate));
        assert!(role_has_permission(Role::Admin, Permission::HubsApprove));
        assert!(role_has_permission(Role::Admin, Permission::HubsDelete));
    }

    #[test]
    fn roles_granting_matches_forward_map() {
        for permission in Permission::all() {
            for role in roles_granting(*permission) {
                assert!(role_has_permission(role, *permission));
            }
            for role in Role::all() {
                if role_has_permission(*role, *permission) {
                    assert!(roles_granting(*permission).contains(role));
                }
            }
        }
    }

    fn any_permission() -> impl Strategy<Value = Permission> {
        prop::sample::select(Permission::all().to_vec())
    }

    fn any_role() -> impl Strategy<Value = Role> {
        prop::sample::select(Role::all().to_vec())
    }

    proptest! {
        #[test]
        fn permission_round_trips_storage_value(permission in any_permission()) {
            let restored = Permission::from_str(permission.as_str());
            prop_assert_eq!(restored.ok(), Some(permission));
        }

        #[test]
        fn role_round_trips_storage_value(role in any_role()) {
            let restored = Role::from_str(role.as_str());
            prop_assert_eq!(restored.ok(), Some(role));
        }

        #[test]
        fn caller_permission_agrees_with_effective_set(
            roles in prop::collection::btree_set(any_role(), 0..4),
            permission in any_permission(),
        ) {
            let effective = effective_permissions(&roles);
            prop_assert_eq!(
                caller_has_permission(&roles, permission),
                effective.contains(&permission)
            );
        }
    }
}
