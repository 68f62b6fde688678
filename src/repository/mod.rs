//! Storage seams consumed by the services.
//!
//! `PgStore` backs production; `MemoryStore` keeps everything in process and is
//! what the test suite drives. Both enforce the one-application-per
//! `(candidate, job)` rule themselves rather than trusting callers.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::application::{
    ApplicationFilter, ApplicationStage, FollowUpNote, JobApplication, NewFollowUpNote,
    NewJobApplication,
};
use crate::models::audit_event::{AuditEvent, NewAuditEvent};
use crate::models::cv_profile::{CvProfile, NewCvProfile};
use crate::models::interview::{
    InterviewFilter, InterviewSchedule, InterviewStatus, NewInterviewSchedule,
};
use crate::models::job_posting::{JobPosting, NewJobPosting};
use crate::models::notification::{
    NewNotification, NewNotificationDelivery, Notification, NotificationDelivery,
};
use crate::models::user::User;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Read-only view of the user base owned by the authentication subsystem.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>>;
    async fn list_active_admins(&self) -> Result<Vec<i64>>;
    async fn list_active_candidates(&self) -> Result<Vec<i64>>;
}

#[async_trait]
pub trait CvRepository: Send + Sync {
    async fn insert_cv_profile(&self, cv: NewCvProfile) -> Result<CvProfile>;
    async fn find_cv_profile(&self, id: i64) -> Result<Option<CvProfile>>;
    /// Most recently created CV of the candidate, if any.
    async fn latest_cv_profile(&self, candidate_id: i64) -> Result<Option<CvProfile>>;
    async fn list_cv_profiles(&self, candidate_id: i64) -> Result<Vec<CvProfile>>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting>;
    async fn find_job(&self, id: i64) -> Result<Option<JobPosting>>;
    async fn list_jobs(&self, open_only: bool) -> Result<Vec<JobPosting>>;
    async fn update_job(&self, job: &JobPosting) -> Result<bool>;
    async fn delete_job(&self, id: i64) -> Result<bool>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn application_exists(&self, candidate_id: i64, job_posting_id: i64) -> Result<bool>;
    /// Writes the application and its scorecard as one unit. A duplicate
    /// `(candidate, job)` pair fails with `Error::AlreadyApplied`.
    async fn insert_application(&self, application: NewJobApplication) -> Result<JobApplication>;
    async fn find_application(&self, id: i64) -> Result<Option<JobApplication>>;
    /// Newest submissions first.
    async fn list_applications(&self, filter: ApplicationFilter) -> Result<Vec<JobApplication>>;
    async fn update_application_stage(
        &self,
        id: i64,
        stage: ApplicationStage,
        at: DateTime<Utc>,
    ) -> Result<bool>;
    async fn insert_follow_up_note(&self, note: NewFollowUpNote) -> Result<FollowUpNote>;
    /// Newest notes first.
    async fn list_follow_up_notes(&self, application_id: i64) -> Result<Vec<FollowUpNote>>;
}

#[async_trait]
pub trait InterviewRepository: Send + Sync {
    /// Inserts the interview and moves its application to `InterviewScheduled`
    /// in the same write.
    async fn schedule_interview(&self, interview: NewInterviewSchedule) -> Result<InterviewSchedule>;
    async fn find_interview(&self, id: i64) -> Result<Option<InterviewSchedule>>;
    async fn update_interview_status(
        &self,
        id: i64,
        status: InterviewStatus,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<bool>;
    /// Latest scheduled start first.
    async fn list_interviews(&self, filter: InterviewFilter) -> Result<Vec<InterviewSchedule>>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<AuditEvent>;
    /// Newest first, optionally restricted to one actor.
    async fn list_audit_events(&self, actor_user_id: Option<i64>, limit: i64) -> Result<Vec<AuditEvent>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification>;
    async fn insert_deliveries(
        &self,
        deliveries: Vec<NewNotificationDelivery>,
    ) -> Result<Vec<NotificationDelivery>>;
    async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>>;
    async fn list_deliveries(&self, notification_id: i64) -> Result<Vec<NotificationDelivery>>;
    async fn count_unread(&self, user_id: i64) -> Result<i64>;
    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<bool>;
    async fn mark_all_read(&self, user_id: i64) -> Result<u64>;
}

/// Everything the services need from one backing store.
pub trait RecruitmentStore:
    UserDirectory
    + CvRepository
    + JobRepository
    + ApplicationRepository
    + InterviewRepository
    + AuditRepository
    + NotificationRepository
{
}

impl<T> RecruitmentStore for T where
    T: UserDirectory
        + CvRepository
        + JobRepository
        + ApplicationRepository
        + InterviewRepository
        + AuditRepository
        + NotificationRepository
{
}

pub(crate) fn skills_to_csv(skills: &[String]) -> String {
    skills.join(",")
}

pub(crate) fn skills_from_csv(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
