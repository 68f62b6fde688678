use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a job application. Admins may set any value directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ApplicationStage {
    Applied,
    UnderReview,
    Shortlisted,
    InterviewScheduled,
    Rejected,
    Hired,
}

impl ApplicationStage {
    pub const ALL: [ApplicationStage; 6] = [
        ApplicationStage::Applied,
        ApplicationStage::UnderReview,
        ApplicationStage::Shortlisted,
        ApplicationStage::InterviewScheduled,
        ApplicationStage::Rejected,
        ApplicationStage::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStage::Applied => "Applied",
            ApplicationStage::UnderReview => "UnderReview",
            ApplicationStage::Shortlisted => "Shortlisted",
            ApplicationStage::InterviewScheduled => "InterviewScheduled",
            ApplicationStage::Rejected => "Rejected",
            ApplicationStage::Hired => "Hired",
        }
    }

    pub fn is_pending_review(&self) -> bool {
        matches!(self, ApplicationStage::Applied | ApplicationStage::UnderReview)
    }
}

impl fmt::Display for ApplicationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

/// Decomposed match assessment stored alongside each application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub skill_match_score: Decimal,
    pub experience_score: Decimal,
    pub education_score: Decimal,
    pub certifications_score: Decimal,
    pub overall_score: Decimal,
    pub strengths_breakdown: String,
    pub gaps_breakdown: String,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobApplication {
    pub id: i64,
    pub job_posting_id: i64,
    pub candidate_id: i64,
    pub cv_profile_id: Option<i64>,
    pub cover_letter: String,
    pub strengths_summary: String,
    pub weaknesses_summary: String,
    pub match_score: Decimal,
    pub stage: ApplicationStage,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scorecard: Scorecard,
}

#[derive(Debug, Clone)]
pub struct NewJobApplication {
    pub job_posting_id: i64,
    pub candidate_id: i64,
    pub cv_profile_id: Option<i64>,
    pub cover_letter: String,
    pub strengths_summary: String,
    pub weaknesses_summary: String,
    pub match_score: Decimal,
    pub submitted_at: DateTime<Utc>,
    pub scorecard: Scorecard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpNote {
    pub id: i64,
    pub job_application_id: i64,
    pub admin_id: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFollowUpNote {
    pub job_application_id: i64,
    pub admin_id: i64,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationFilter {
    pub candidate_id: Option<i64>,
    pub job_posting_id: Option<i64>,
}

impl ApplicationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_candidate(candidate_id: i64) -> Self {
        Self {
            candidate_id: Some(candidate_id),
            job_posting_id: None,
        }
    }

    pub fn for_job(job_posting_id: i64) -> Self {
        Self {
            candidate_id: None,
            job_posting_id: Some(job_posting_id),
        }
    }

    pub fn matches(&self, application: &JobApplication) -> bool {
        self.candidate_id.map_or(true, |id| application.candidate_id == id)
            && self
                .job_posting_id
                .map_or(true, |id| application.job_posting_id == id)
    }
}
