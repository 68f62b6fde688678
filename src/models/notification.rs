use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    JobPosted,
    ApplicationSubmitted,
    ApplicationStatusUpdated,
    FollowUpNoteAdded,
    System,
    InterviewScheduled,
    InterviewUpdated,
}

impl NotificationType {
    pub const ALL: [NotificationType; 7] = [
        NotificationType::JobPosted,
        NotificationType::ApplicationSubmitted,
        NotificationType::ApplicationStatusUpdated,
        NotificationType::FollowUpNoteAdded,
        NotificationType::System,
        NotificationType::InterviewScheduled,
        NotificationType::InterviewUpdated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::JobPosted => "JobPosted",
            NotificationType::ApplicationSubmitted => "ApplicationSubmitted",
            NotificationType::ApplicationStatusUpdated => "ApplicationStatusUpdated",
            NotificationType::FollowUpNoteAdded => "FollowUpNoteAdded",
            NotificationType::System => "System",
            NotificationType::InterviewScheduled => "InterviewScheduled",
            NotificationType::InterviewUpdated => "InterviewUpdated",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryChannel {
    InApp,
    Email,
    Sms,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryChannel::InApp => "InApp",
            DeliveryChannel::Email => "Email",
            DeliveryChannel::Sms => "Sms",
        }
    }
}

impl fmt::Display for DeliveryChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inapp" => Ok(DeliveryChannel::InApp),
            "email" => Ok(DeliveryChannel::Email),
            "sms" => Ok(DeliveryChannel::Sms),
            _ => Err(s.to_string()),
        }
    }
}

/// Per-recipient message. Only `is_read` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_job_posting_id: Option<i64>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_job_posting_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationDelivery {
    pub id: i64,
    pub notification_id: i64,
    pub channel: DeliveryChannel,
    pub destination: String,
    pub is_success: bool,
    pub provider_response: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotificationDelivery {
    pub notification_id: i64,
    pub channel: DeliveryChannel,
    pub destination: String,
    pub is_success: bool,
    pub provider_response: String,
    pub sent_at: DateTime<Utc>,
}
