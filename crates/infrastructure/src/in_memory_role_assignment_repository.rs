use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use pragmadic_application::{RoleAssignment, RoleAssignmentRepository};
use pragmadic_core::{AppResult, UserId};
use pragmadic_domain::Role;


/// In-memory role assignment repository for tests and local development.
#[derive(Debug, Default)]
pub struct InMemoryRoleAssignmentRepository {
    assignments: RwLock<HashMap<UserId, BTreeMap<Role, String>>>,
}

impl InMemoryRoleAssignmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            assignments: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RoleAssignmentRepository for InMemoryRoleAssignmentRepository {
    async fn get_roles(&self, user_id: UserId) -> AppResult<BTreeSet<Role>> {
        Ok(self
            .assignments
            .read()
            .await
            .get(&user_id)
            .map(|roles| roles.keys().copied().collect())
            .unwrap_or_default())
    }

    async fn set_roles(&self, user_id: UserId, roles: BTreeSet<Role>) -> AppResult<()> {
        // The whole entry is swapped under one write lock, so readers see
        // either the previous set or the new one, never the empty interim.
        let assigned_at = chrono::Utc::now().to_rfc3339();
        let replacement: BTreeMap<Role, String> = roles
            .into_iter()
            .map(|role| (role, assigned_at.clone()))
            .collect();

        self.assignments.write().await.insert(user_id, replacement);
        Ok(())
    }

    async fn add_role(&self, user_id: UserId, role: Role) -> AppResult<()> {
        self.assignments
            .write()
            .await
            .entry(user_id)
            .or_default()
            .entry(role)
            .or_insert_with(|| chrono::Utc::now().to_rfc3339());
        Ok(())
    }

    async fn list_assignments(&self) -> AppResult<Vec<RoleAssignment>> {
        let assignments = self.assignments.read().await;

        let mut values: Vec<RoleAssignment> = assignments
            .iter()
            .flat_map(|(user_id, roles)| {
                roles.iter().map(|(role, assigned_at)| RoleAssignment {
                    user_id: *user_id,
                    role: *role,
                    assigned_at: assigned_at.clone(),
                })
            })
            .collect();
        values.sort_by(|left, right| {
            (left.user_id.as_uuid(), left.role).cmp(&(right.user_id.as_uuid(), right.role))
        });

        Ok(values)
    }
}
