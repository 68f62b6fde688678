use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit row as shown to readers, with the actor resolved to a display name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEventView {
    pub id: i64,
    pub actor_user_id: Option<i64>,
    pub actor_name: String,
    pub source: String,
    pub action: String,
    pub category: String,
    pub related_entity_id: Option<i64>,
    pub details: String,
    pub created_at: DateTime<Utc>,
}
