use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::notification::{Notification, NotificationType};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_job_posting_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationView {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            title: n.title,
            message: n.message,
            notification_type: n.notification_type,
            related_job_posting_id: n.related_job_posting_id,
            is_read: n.is_read,
            created_at: n.created_at,
        }
    }
}
