use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only action log row. `actor_user_id` is `None` for system-initiated events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: i64,
    pub actor_user_id: Option<i64>,
    pub source: String,
    pub action: String,
    pub category: String,
    pub related_entity_id: Option<i64>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEvent {
    pub actor_user_id: Option<i64>,
    pub source: String,
    pub action: String,
    pub category: String,
    pub related_entity_id: Option<i64>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
