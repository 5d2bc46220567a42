//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod security;

pub use security::{
    AuditAction, Permission, Role, caller_has_permission, effective_permissions,
    permissions_for_role, permissions_for_role_name, role_has_permission, roles_granting,
};
