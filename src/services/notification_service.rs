use std::sync::Arc;
use tracing::{info, warn};

use crate::dto::notification_dto::NotificationView;
use crate::error::Result;
use crate::models::notification::{
    DeliveryChannel, NewNotification, NewNotificationDelivery, Notification, NotificationDelivery,
    NotificationType,
};
use crate::repository::{NotificationRepository, UserDirectory};
use crate::services::email_service::EmailSender;
use crate::services::sms_service::SmsSender;
use crate::utils::text::truncate_chars;
use crate::utils::time::now;

const MAX_TITLE_CHARS: usize = 160;
const MAX_MESSAGE_CHARS: usize = 2000;
const MAX_DESTINATION_CHARS: usize = 250;
const MAX_PROVIDER_RESPONSE_CHARS: usize = 1000;
const IN_APP_RESPONSE: &str = "Stored in-app";

/// What to tell a recipient and over which channels. In-app is always on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_job_posting_id: Option<i64>,
    pub send_email: bool,
    pub send_sms: bool,
}

impl OutboundMessage {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        notification_type: NotificationType,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            notification_type,
            related_job_posting_id: None,
            send_email: false,
            send_sms: false,
        }
    }

    pub fn for_job(mut self, job_posting_id: i64) -> Self {
        self.related_job_posting_id = Some(job_posting_id);
        self
    }

    pub fn with_email(mut self) -> Self {
        self.send_email = true;
        self
    }

    pub fn with_sms(mut self) -> Self {
        self.send_sms = true;
        self
    }
}

#[derive(Clone)]
pub struct NotificationService {
    users: Arc<dyn UserDirectory>,
    notifications: Arc<dyn NotificationRepository>,
    email: Arc<dyn EmailSender>,
    sms: Arc<dyn SmsSender>,
}

impl NotificationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        notifications: Arc<dyn NotificationRepository>,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        Self {
            users,
            notifications,
            email,
            sms,
        }
    }

    /// Stores a notification for `user_id` and attempts each requested channel.
    ///
    /// Returns `None` without writing anything when the user is missing or
    /// inactive. Provider failures end up as unsuccessful delivery rows.
    pub async fn notify(&self, user_id: i64, outbound: &OutboundMessage) -> Result<Option<Notification>> {
        let Some(user) = self.users.find_user(user_id).await?.filter(|u| u.is_active) else {
            return Ok(None);
        };

        let title = truncate_chars(outbound.title.trim(), MAX_TITLE_CHARS);
        let message = truncate_chars(outbound.message.trim(), MAX_MESSAGE_CHARS);

        let notification = self
            .notifications
            .insert_notification(NewNotification {
                user_id,
                title: title.clone(),
                message: message.clone(),
                notification_type: outbound.notification_type,
                related_job_posting_id: outbound.related_job_posting_id,
                created_at: now(),
            })
            .await?;

        let mut deliveries = vec![delivery_row(
            notification.id,
            DeliveryChannel::InApp,
            &user.email,
            true,
            IN_APP_RESPONSE,
        )];

        if outbound.send_email && !user.email.trim().is_empty() {
            let outcome = self.email.send(&user.email, &title, &message).await;
            if !outcome.success {
                warn!(user_id, channel = "email", response = %outcome.response, "delivery failed");
            }
            deliveries.push(delivery_row(
                notification.id,
                DeliveryChannel::Email,
                &user.email,
                outcome.success,
                &outcome.response,
            ));
        }

        if outbound.send_sms && !user.phone_number.trim().is_empty() {
            let outcome = self.sms.send(&user.phone_number, &message).await;
            if !outcome.success {
                warn!(user_id, channel = "sms", response = %outcome.response, "delivery failed");
            }
            deliveries.push(delivery_row(
                notification.id,
                DeliveryChannel::Sms,
                &user.phone_number,
                outcome.success,
                &outcome.response,
            ));
        }

        self.notifications.insert_deliveries(deliveries).await?;
        Ok(Some(notification))
    }

    /// Notifies every active candidate in turn. A failure for one recipient
    /// is logged and the loop moves on. Returns how many were notified.
    pub async fn broadcast_to_candidates(&self, outbound: &OutboundMessage) -> Result<usize> {
        let candidate_ids = self.users.list_active_candidates().await?;
        let mut notified = 0;

        for candidate_id in candidate_ids {
            match self.notify(candidate_id, outbound).await {
                Ok(Some(_)) => notified += 1,
                Ok(None) => {}
                Err(e) => {
                    warn!(user_id = candidate_id, error = %e, "broadcast notification failed");
                }
            }
        }

        info!(title = %outbound.title, notified, "broadcast finished");
        Ok(notified)
    }

    pub async fn list(&self, user_id: i64) -> Result<Vec<NotificationView>> {
        let items = self.notifications.list_notifications(user_id).await?;
        Ok(items.into_iter().map(NotificationView::from).collect())
    }

    pub async fn unread_count(&self, user_id: i64) -> Result<i64> {
        self.notifications.count_unread(user_id).await
    }

    /// Only the owner can flip their notification; `false` otherwise.
    pub async fn mark_as_read(&self, user_id: i64, notification_id: i64) -> Result<bool> {
        self.notifications
            .mark_notification_read(user_id, notification_id)
            .await
    }

    pub async fn mark_all_as_read(&self, user_id: i64) -> Result<u64> {
        self.notifications.mark_all_read(user_id).await
    }

    pub async fn deliveries(&self, notification_id: i64) -> Result<Vec<NotificationDelivery>> {
        self.notifications.list_deliveries(notification_id).await
    }
}

fn delivery_row(
    notification_id: i64,
    channel: DeliveryChannel,
    destination: &str,
    is_success: bool,
    provider_response: &str,
) -> NewNotificationDelivery {
    NewNotificationDelivery {
        notification_id,
        channel,
        destination: truncate_chars(destination, MAX_DESTINATION_CHARS),
        is_success,
        provider_response: truncate_chars(provider_response, MAX_PROVIDER_RESPONSE_CHARS),
        sent_at: now(),
    }
}
