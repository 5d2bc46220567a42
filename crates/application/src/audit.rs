use async_trait::async_trait;
use pragmadic_core::AppResult;
use pragmadic_domain::AuditAction;

/// Audit event appended by application use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Actor subject (user identifier).
    pub subject: String,
    /// Stable action identifier.
    pub action: AuditAction,
    /// Event resource type.
    pub resource_type: String,
    /// Event resource identifier.
    pub resource_id: String,
    /// Optional event detail.
    pub detail: Option<String>,
}

/// Repository port for the append-only audit trail.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends an event to the audit trail.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
