use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::communication_dto::{CampaignSummary, EmailCampaignPayload};
use crate::error::{Error, Result};
use crate::models::notification::NotificationType;
use crate::models::user::{User, UserRole};
use crate::repository::UserDirectory;
use crate::services::audit_service::{AuditEntry, AuditService};
use crate::services::email_service::EmailSender;
use crate::services::guard::{absorb, require_active};
use crate::services::notification_service::{NotificationService, OutboundMessage};
use crate::utils::text::replace_ignore_ascii_case;

const AUDIT_SOURCE: &str = "AdminEmail";
const AUDIT_CATEGORY: &str = "Communication";

/// Admin-initiated e-mail to chosen users. Unlike notifications, the e-mail
/// goes out first and only a delivered message lands in the inbox.
#[derive(Clone)]
pub struct CommunicationService {
    users: Arc<dyn UserDirectory>,
    email: Arc<dyn EmailSender>,
    audit: AuditService,
    notifications: NotificationService,
}

impl CommunicationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        email: Arc<dyn EmailSender>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            users,
            email,
            audit,
            notifications,
        }
    }

    pub async fn send_email_campaign(
        &self,
        admin_id: i64,
        payload: EmailCampaignPayload,
    ) -> Result<CampaignSummary> {
        require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only active admin users can perform this action.",
        )
        .await?;
        payload.validate()?;

        let subject = payload.subject.trim();
        if subject.is_empty() || payload.message.trim().is_empty() {
            return Err(Error::Validation(
                "Subject and message cannot be blank.".to_string(),
            ));
        }

        let recipients = self.recipients(&payload).await?;
        let mut summary = CampaignSummary {
            requested_recipients: recipients.len(),
            successfully_sent: 0,
            failed: 0,
        };

        for recipient in recipients {
            let message = personalize(&payload.message, &recipient);
            let outcome = self.email.send(&recipient.email, subject, &message).await;

            if outcome.success {
                summary.successfully_sent += 1;
                let copy = OutboundMessage::new(subject, message, NotificationType::System);
                absorb(
                    self.notifications.notify(recipient.id, &copy).await,
                    "campaign inbox copy",
                    recipient.id,
                );
            } else {
                summary.failed += 1;
                warn!(user_id = recipient.id, response = %outcome.response, "campaign e-mail failed");
                absorb(
                    self.audit
                        .record_event(
                            AuditEntry::new(AUDIT_SOURCE, "SendFailed", AUDIT_CATEGORY)
                                .actor(admin_id)
                                .related(recipient.id)
                                .details(format!(
                                    "Failed email to '{}': {}",
                                    recipient.email, outcome.response
                                ))
                                .notify_admins(),
                        )
                        .await,
                    "audit",
                    recipient.id,
                );
            }
        }

        info!(
            admin_id,
            requested = summary.requested_recipients,
            sent = summary.successfully_sent,
            failed = summary.failed,
            "email campaign finished"
        );

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new(AUDIT_SOURCE, "Send", AUDIT_CATEGORY)
                        .actor(admin_id)
                        .details(format!(
                            "Email campaign sent. Requested={}, Success={}, Failed={}.",
                            summary.requested_recipients, summary.successfully_sent, summary.failed
                        ))
                        .notify_admins(),
                )
                .await,
            "audit",
            admin_id,
        );

        Ok(summary)
    }

    /// Active users among the explicit ids and, when asked, all active
    /// candidates. Each user appears once, in id order.
    async fn recipients(&self, payload: &EmailCampaignPayload) -> Result<Vec<User>> {
        let mut ids: BTreeSet<i64> = payload.user_ids.iter().copied().filter(|id| *id > 0).collect();
        if payload.include_all_candidates {
            ids.extend(self.users.list_active_candidates().await?);
        }

        let mut recipients = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(user) = self.users.find_user(id).await?.filter(|u| u.is_active) {
                recipients.push(user);
            }
        }
        Ok(recipients)
    }
}

/// Fills `{{field}}`, `{field}` and `[field]` placeholders, case-insensitively.
fn personalize(template: &str, user: &User) -> String {
    let fields = [
        ("firstName", user.first_name.as_str()),
        ("lastName", user.last_name.as_str()),
        ("email", user.email.as_str()),
    ];

    let mut message = template.to_string();
    for (name, value) in fields {
        for token in [
            format!("{{{{{name}}}}}"),
            format!("{{{name}}}"),
            format!("[{name}]"),
        ] {
            message = replace_ignore_ascii_case(&message, &token, value);
        }
    }
    message
}
