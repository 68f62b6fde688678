use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::dto::audit_dto::AuditEventView;
use crate::error::Result;
use crate::models::audit_event::{AuditEvent, NewAuditEvent};
use crate::models::notification::NotificationType;
use crate::repository::{AuditRepository, UserDirectory};
use crate::services::notification_service::{NotificationService, OutboundMessage};
use crate::utils::text::truncate_chars;
use crate::utils::time::now;

pub const DEFAULT_READ_COUNT: i64 = 100;
pub const MAX_READ_COUNT: i64 = 500;
const SYSTEM_ACTOR: &str = "System";
const MAX_LABEL_CHARS: usize = 120;
const MAX_DETAILS_CHARS: usize = 2000;

/// One audit row to append, optionally echoed to the other admins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub actor_user_id: Option<i64>,
    pub source: String,
    pub action: String,
    pub category: String,
    pub related_entity_id: Option<i64>,
    pub details: String,
    pub notify_admins: bool,
}

impl AuditEntry {
    pub fn new(source: impl Into<String>, action: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            actor_user_id: None,
            source: source.into(),
            action: action.into(),
            category: category.into(),
            related_entity_id: None,
            details: String::new(),
            notify_admins: false,
        }
    }

    pub fn actor(mut self, user_id: i64) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn related(mut self, entity_id: i64) -> Self {
        self.related_entity_id = Some(entity_id);
        self
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn notify_admins(mut self) -> Self {
        self.notify_admins = true;
        self
    }
}

#[derive(Clone)]
pub struct AuditService {
    users: Arc<dyn UserDirectory>,
    events: Arc<dyn AuditRepository>,
    notifications: NotificationService,
}

impl AuditService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        events: Arc<dyn AuditRepository>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            users,
            events,
            notifications,
        }
    }

    /// Appends the event. With `notify_admins`, every active admin other than
    /// the actor also gets an in-app notice; a failed notice is logged only.
    pub async fn record_event(&self, entry: AuditEntry) -> Result<AuditEvent> {
        let event = self
            .events
            .insert_audit_event(NewAuditEvent {
                actor_user_id: entry.actor_user_id,
                source: truncate_chars(entry.source.trim(), MAX_LABEL_CHARS),
                action: truncate_chars(entry.action.trim(), MAX_LABEL_CHARS),
                category: truncate_chars(entry.category.trim(), MAX_LABEL_CHARS),
                related_entity_id: entry.related_entity_id,
                details: truncate_chars(entry.details.trim(), MAX_DETAILS_CHARS),
                created_at: now(),
            })
            .await?;

        debug!(
            event_id = event.id,
            source = %event.source,
            action = %event.action,
            "audit event recorded"
        );

        if !entry.notify_admins {
            return Ok(event);
        }

        let actor_name = self.actor_name(event.actor_user_id).await?;
        let outbound = OutboundMessage::new(
            format!("{} {}", event.source, event.action),
            format!("{}: {}", actor_name, event.details),
            NotificationType::System,
        );

        for admin_id in self.users.list_active_admins().await? {
            if Some(admin_id) == event.actor_user_id {
                continue;
            }
            if let Err(e) = self.notifications.notify(admin_id, &outbound).await {
                warn!(user_id = admin_id, event_id = event.id, error = %e, "admin audit notice failed");
            }
        }

        Ok(event)
    }

    pub async fn latest(&self, count: Option<i64>) -> Result<Vec<AuditEventView>> {
        let events = self
            .events
            .list_audit_events(None, normalize_count(count))
            .await?;
        self.hydrate(events).await
    }

    pub async fn mine(&self, user_id: i64, count: Option<i64>) -> Result<Vec<AuditEventView>> {
        let events = self
            .events
            .list_audit_events(Some(user_id), normalize_count(count))
            .await?;
        self.hydrate(events).await
    }

    async fn actor_name(&self, actor_user_id: Option<i64>) -> Result<String> {
        let Some(id) = actor_user_id else {
            return Ok(SYSTEM_ACTOR.to_string());
        };
        Ok(self
            .users
            .find_user(id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_else(|| SYSTEM_ACTOR.to_string()))
    }

    async fn hydrate(&self, events: Vec<AuditEvent>) -> Result<Vec<AuditEventView>> {
        let mut names: HashMap<Option<i64>, String> = HashMap::new();
        let mut views = Vec::with_capacity(events.len());

        for event in events {
            let actor_name = match names.get(&event.actor_user_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.actor_name(event.actor_user_id).await?;
                    names.insert(event.actor_user_id, name.clone());
                    name
                }
            };

            views.push(AuditEventView {
                id: event.id,
                actor_user_id: event.actor_user_id,
                actor_name,
                source: event.source,
                action: event.action,
                category: event.category,
                related_entity_id: event.related_entity_id,
                details: event.details,
                created_at: event.created_at,
            });
        }

        Ok(views)
    }
}

/// Requested read size clamped to `1..=500`, defaulting to 100.
pub fn normalize_count(count: Option<i64>) -> i64 {
    count.unwrap_or(DEFAULT_READ_COUNT).clamp(1, MAX_READ_COUNT)
}
