use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::application::ApplicationStage;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApplyForJobPayload {
    pub job_posting_id: i64,
    pub cv_profile_id: Option<i64>,
    #[serde(default)]
    #[validate(length(max = 3000))]
    pub cover_letter: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStagePayload {
    pub application_id: i64,
    #[serde(default)]
    pub stage: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFollowUpNotePayload {
    pub application_id: i64,
    #[validate(length(min = 1, max = 2000))]
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpNoteView {
    pub id: i64,
    pub admin_id: i64,
    pub admin_name: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Application hydrated with job title, candidate identity, scorecard and notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplicationView {
    pub id: i64,
    pub job_posting_id: i64,
    pub job_title: String,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub candidate_email: String,
    pub cv_profile_id: Option<i64>,
    pub stage: ApplicationStage,
    pub cover_letter: String,
    pub strengths_summary: String,
    pub weaknesses_summary: String,
    pub match_score: Decimal,
    pub skill_match_score: Decimal,
    pub experience_score: Decimal,
    pub education_score: Decimal,
    pub certifications_score: Decimal,
    pub overall_score: Decimal,
    pub submitted_at: DateTime<Utc>,
    pub follow_up_notes: Vec<FollowUpNoteView>,
}
