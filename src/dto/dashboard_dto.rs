use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: i64,
}

impl ChartPoint {
    pub fn new(label: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_candidates: i64,
    pub total_admins: i64,
    pub open_job_postings: i64,
    pub closed_job_postings: i64,
    pub total_applications: i64,
    pub pending_review_applications: i64,
    pub total_interviews_scheduled: i64,
    pub average_match_score: Decimal,
    pub job_posts_by_month: Vec<ChartPoint>,
    pub applications_by_month: Vec<ChartPoint>,
    pub applications_by_stage: Vec<ChartPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateDashboard {
    pub open_job_postings: i64,
    pub my_applications: i64,
    pub interview_scheduled: i64,
    pub notifications_unread: i64,
    pub my_applications_by_stage: Vec<ChartPoint>,
}
