// Audit logging for link and billing mutations
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditAction {
    LinkCreated,
    LinkUpdated,
    LinkDeleted,
    LinksReordered,
    LinkClicked,
    ProfileUpdated,
    SubscriptionCreated,
    SubscriptionStatusChanged,
}

impl AuditAction {
    fn resource_type(&self) -> &'static str {
        match self {
            AuditAction::LinkCreated
            | AuditAction::LinkUpdated
            | AuditAction::LinkDeleted
            | AuditAction::LinkClicked => "link",
            AuditAction::LinksReordered => "link_list",
            AuditAction::ProfileUpdated => "user",
            AuditAction::SubscriptionCreated | AuditAction::SubscriptionStatusChanged => {
                "subscription"
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: Uuid,
    pub action: AuditAction,
    pub user_id: Uuid,
    pub resource_id: Option<String>,
    pub resource_type: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        action: AuditAction,
        user_id: Uuid,
        resource_id: Option<String>,
        details: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action,
            user_id,
            resource_id,
            resource_type: action.resource_type().to_string(),
            details,
            timestamp: Utc::now(),
        }
    }
}

pub struct AuditLogger;

impl AuditLogger {
    /// Emit an audit record on the `audit` tracing target
    pub fn log(
        action: AuditAction,
        user_id: Uuid,
        resource_id: Option<String>,
        details: Option<String>,
    ) {
        let audit_log = AuditLog::new(action, user_id, resource_id, details);

        let json_log = serde_json::to_string(&audit_log).unwrap_or_else(|e| {
            warn!("Failed to serialize audit log: {}", e);
            format!("{:?}", audit_log)
        });

        info!(target: "audit", "{}", json_log);
    }

    pub fn log_link_action(
        action: AuditAction,
        user_id: Uuid,
        link_id: Uuid,
        details: Option<String>,
    ) {
        Self::log(action, user_id, Some(link_id.to_string()), details);
    }
}
