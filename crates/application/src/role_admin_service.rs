use std::collections::BTreeSet;
use std::sync::Arc;

use pragmadic_core::{AppError, AppResult, UserId, UserIdentity};
use pragmadic_domain::{AuditAction, Permission, Role};

use crate::{
    AuditEvent, AuditRepository, AuthorizationService, RoleAssignment, RoleAssignmentRepository,
};

/// Application service for administrative role management.
///
/// Every mutation is gated on the actor before the repository is touched and
/// appends an audit event after it succeeds.
#[derive(Clone)]
pub struct RoleAdminService {
    authorization_service: AuthorizationService,
    repository: Arc<dyn RoleAssignmentRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleAdminService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization_service: AuthorizationService,
        repository: Arc<dyn RoleAssignmentRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization_service,
            repository,
            audit_repository,
        }
    }

    /// Replaces a user's entire role set and emits an audit event.
    ///
    /// A managed user holds at least one role, so an empty replacement set
    /// is rejected before the store is consulted.
    pub async fn replace_roles(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        roles: BTreeSet<Role>,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor.user_id(), Permission::UsersRolesManage)
            .await?;

        if roles.is_empty() {
            return Err(AppError::Validation(
                "a user must hold at least one role".to_owned(),
            ));
        }

        self.repository.set_roles(user_id, roles.clone()).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id().to_string(),
                action: AuditAction::SecurityRolesReplaced,
                resource_type: "user_roles".to_owned(),
                resource_id: user_id.to_string(),
                detail: Some(format!(
                    "replaced roles for '{user_id}' with [{}]",
                    roles
                        .iter()
                        .map(Role::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
            })
            .await
    }

    /// Appends a role to a user's set and emits an audit event.
    ///
    /// Adding a role the user already holds is a no-op in the store.
    pub async fn add_role(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
        role: Role,
    ) -> AppResult<()> {
        self.authorization_service
            .require_permission(actor.user_id(), Permission::UsersRolesManage)
            .await?;

        self.repository.add_role(user_id, role).await?;

        self.audit_repository
            .append_event(AuditEvent {
                subject: actor.user_id().to_string(),
                action: AuditAction::SecurityRoleAdded,
                resource_type: "user_roles".to_owned(),
                resource_id: format!("{user_id}:{}", role.as_str()),
                detail: Some(format!("added role '{}' to '{user_id}'", role.as_str())),
            })
            .await
    }

    /// Returns the roles currently assigned to a user, for administrators.
    pub async fn roles_for_user(
        &self,
        actor: &UserIdentity,
        user_id: UserId,
    ) -> AppResult<BTreeSet<Role>> {
        self.authorization_service
            .require_permission(actor.user_id(), Permission::UsersRolesManage)
            .await?;

        self.repository.get_roles(user_id).await
    }

    /// Lists all current role assignments, for administrators.
    pub async fn list_assignments(&self, actor: &UserIdentity) -> AppResult<Vec<RoleAssignment>> {
        self.authorization_service
            .require_permission(actor.user_id(), Permission::UsersRolesManage)
            .await?;

        self.repository.list_assignments().await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};
    use std::sync::Arc;

    use async_trait::async_trait;
    use pragmadic_core::{AppError, AppResult, UserId, UserIdentity};
    use pragmadic_domain::Role;
    use tokio::sync::Mutex;

    use crate::{
        AuditEvent, AuditRepository, AuthorizationService, RoleAssignment,
        RoleAssignmentRepository,
    };

    use super::RoleAdminService;

    #[derive(Default)]
    struct FakeAuditRepository {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditRepository for FakeAuditRepository {
        async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
            self.events.lock().await.push(event);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingRoleAssignmentRepository {
        roles: Mutex<HashMap<UserId, BTreeSet<Role>>>,
        set_roles_calls: Mutex<usize>,
    }

    #[async_trait]
    impl RoleAssignmentRepository for RecordingRoleAssignmentRepository {
        async fn get_roles(&self, user_id: UserId) -> AppResult<BTreeSet<Role>> {
            Ok(self
                .roles
                .lock()
                .await
                .get(&user_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn set_roles(&self, user_id: UserId, roles: BTreeSet<Role>) -> AppResult<()> {
            *self.set_roles_calls.lock().await += 1;
            self.roles.lock().await.insert(user_id, roles);
            Ok(())
        }

        async fn add_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
            self.roles
                .lock()
                .await
                .entry(user_id)
                .or_default()
                .insert(role);
            Ok(())
        }

        async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
            Ok(Vec::new())
        }
    }

    fn actor(user_id: UserId) -> UserIdentity {
        UserIdentity::new(user_id, "admin", None)
    }

    async fn service_with_actor_roles(
        actor_id: UserId,
        roles: BTreeSet<Role>,
    ) -> (
        RoleAdminService,
        Arc<RecordingRoleAssignmentRepository>,
        Arc<FakeAuditRepository>,
    ) {
        let repository = Arc::new(RecordingRoleAssignmentRepository::default());
        repository.roles.lock().await.insert(actor_id, roles);

        let audit_repository = Arc::new(FakeAuditRepository::default());
        let service = RoleAdminService::new(
            AuthorizationService::new(repository.clone()),
            repository.clone(),
            audit_repository.clone(),
        );
        (service, repository, audit_repository)
    }

    #[tokio::test]
    async fn replace_roles_requires_manage_permission() {
        let actor_id = UserId::new();
        let (service, repository, _) =
            service_with_actor_roles(actor_id, BTreeSet::from([Role::Owner])).await;

        let result = service
            .replace_roles(
                &actor(actor_id),
                UserId::new(),
                BTreeSet::from([Role::Nomad]),
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(*repository.set_roles_calls.lock().await, 0);
    }

    #[tokio::test]
    async fn replace_roles_rejects_empty_set() {
        let actor_id = UserId::new();
        let (service, repository, _) =
            service_with_actor_roles(actor_id, BTreeSet::from([Role::Admin])).await;

        let result = service
            .replace_roles(&actor(actor_id), UserId::new(), BTreeSet::new())
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(*repository.set_roles_calls.lock().await, 0);
    }

    #[tokio::test]
    async fn replace_roles_persists_and_writes_audit_event() {
        let actor_id = UserId::new();
        let (service, repository, audit_repository) =
            service_with_actor_roles(actor_id, BTreeSet::from([Role::Admin])).await;

        let target = UserId::new();
        let result = service
            .replace_roles(
                &actor(actor_id),
                target,
                BTreeSet::from([Role::Nomad, Role::Owner]),
            )
            .await;

        assert!(result.is_ok());
        let stored = repository.get_roles(target).await;
        assert_eq!(
            stored.unwrap_or_default(),
            BTreeSet::from([Role::Nomad, Role::Owner])
        );
        assert_eq!(audit_repository.events.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn add_role_is_idempotent_and_audited() {
        let actor_id = UserId::new();
        let (service, repository, audit_repository) =
            service_with_actor_roles(actor_id, BTreeSet::from([Role::Admin])).await;

        let target = UserId::new();
        let first = service.add_role(&actor(actor_id), target, Role::Owner).await;
        let second = service.add_role(&actor(actor_id), target, Role::Owner).await;

        assert!(first.is_ok());
        assert!(second.is_ok());

        let stored = repository.get_roles(target).await;
        assert_eq!(stored.unwrap_or_default(), BTreeSet::from([Role::Owner]));
        assert_eq!(audit_repository.events.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn list_assignments_requires_manage_permission() {
        let actor_id = UserId::new();
        let (service, _, _) =
            service_with_actor_roles(actor_id, BTreeSet::from([Role::Nomad])).await;

        let result = service.list_assignments(&actor(actor_id)).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }
}
