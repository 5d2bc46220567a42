use std::sync::Arc;

use pragmadic_core::{AppResult, UserIdentity};
use pragmadic_domain::{AuditAction, Role};

use crate::{AuditEvent, AuditRepository, RoleAssignmentRepository};

/// Application service completing new-user onboarding.
///
/// The default role is assigned here, explicitly, and nowhere else: a user
/// without assignment rows holds no roles until onboarding completes.
#[derive(Clone)]
pub struct OnboardingService {
    repository: Arc<dyn RoleAssignmentRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl OnboardingService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RoleAssignmentRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            repository,
            audit_repository,
        }
    }

    /// Assigns the default role to the caller and emits an audit event.
    ///
    /// Safe to call more than once; the role append is idempotent.
    pub async fn complete_onboarding(&self, user: &UserIdentity) -> AppResult<()> {
        self.repository
            .add_role(user.user_id(), Role::Regular)
            .await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: user.user_id().to_string(),
                action: AuditAction::UserOnboarded,
                resource_type: "user_roles".to_owned(),
                resource_id: user.user_id().to_string(),
                detail: Some(format!(
                    "assigned default role '{}'",
                    Role::Regular.as_str()
                )),
            })
            .await
    }
}
