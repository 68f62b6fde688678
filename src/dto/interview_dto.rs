use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::interview::InterviewStatus;

fn default_interview_type() -> String {
    "Screening".to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateInterviewPayload {
    pub application_id: i64,
    #[serde(default = "default_interview_type")]
    #[validate(length(max = 80))]
    pub interview_type: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    #[serde(default = "default_time_zone")]
    #[validate(length(max = 80))]
    pub time_zone: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub meeting_link_or_location: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateInterviewStatusPayload {
    pub interview_id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewView {
    pub id: i64,
    pub job_application_id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub admin_id: i64,
    pub admin_name: String,
    pub interview_type: String,
    pub status: InterviewStatus,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub time_zone: String,
    pub meeting_link_or_location: String,
    pub notes: String,
}
