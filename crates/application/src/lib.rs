//! Application services and ports.

#![forbid(unsafe_code)]

mod audit;
mod authorization_service;
mod onboarding_service;
mod role_admin_service;

pub use audit::{AuditEvent, AuditRepository};
pub use authorization_service::{AuthorizationService, RoleAssignment, RoleAssignmentRepository};
pub use onboarding_service::OnboardingService;
pub use role_admin_service::RoleAdminService;
