use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::interview_dto::{CreateInterviewPayload, InterviewView, UpdateInterviewStatusPayload};
use crate::error::{Error, Result};
use crate::models::interview::{
    InterviewFilter, InterviewSchedule, InterviewStatus, NewInterviewSchedule,
};
use crate::models::notification::NotificationType;
use crate::models::user::UserRole;
use crate::repository::{ApplicationRepository, InterviewRepository, JobRepository, UserDirectory};
use crate::services::audit_service::{AuditEntry, AuditService};
use crate::services::guard::{absorb, require_active};
use crate::services::notification_service::{NotificationService, OutboundMessage};
use crate::utils::time::now;

const DEFAULT_INTERVIEW_TYPE: &str = "Screening";
const DEFAULT_TIME_ZONE: &str = "UTC";

#[derive(Clone)]
pub struct InterviewService {
    users: Arc<dyn UserDirectory>,
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    interviews: Arc<dyn InterviewRepository>,
    audit: AuditService,
    notifications: NotificationService,
}

impl InterviewService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        interviews: Arc<dyn InterviewRepository>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            users,
            jobs,
            applications,
            interviews,
            audit,
            notifications,
        }
    }

    pub async fn for_admin(&self, admin_id: i64) -> Result<Vec<InterviewView>> {
        require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only active admin users can view admin interviews.",
        )
        .await?;
        let interviews = self
            .interviews
            .list_interviews(InterviewFilter {
                admin_id: Some(admin_id),
                candidate_id: None,
            })
            .await?;
        self.hydrate_all(interviews).await
    }

    pub async fn for_candidate(&self, candidate_id: i64) -> Result<Vec<InterviewView>> {
        require_active(
            self.users.as_ref(),
            candidate_id,
            UserRole::Candidate,
            "Only active candidate users can view candidate interviews.",
        )
        .await?;
        let interviews = self
            .interviews
            .list_interviews(InterviewFilter {
                admin_id: None,
                candidate_id: Some(candidate_id),
            })
            .await?;
        self.hydrate_all(interviews).await
    }

    /// Books an interview and moves the application to `InterviewScheduled`,
    /// whatever stage it was in before.
    pub async fn schedule(&self, admin_id: i64, payload: CreateInterviewPayload) -> Result<InterviewView> {
        require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only active admin users can schedule interviews.",
        )
        .await?;
        payload.validate()?;

        if payload.scheduled_end <= payload.scheduled_start {
            return Err(Error::InvalidSchedule);
        }

        let application = self
            .applications
            .find_application(payload.application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found.".to_string()))?;

        let interview = self
            .interviews
            .schedule_interview(NewInterviewSchedule {
                job_application_id: application.id,
                candidate_id: application.candidate_id,
                admin_id,
                interview_type: or_default(&payload.interview_type, DEFAULT_INTERVIEW_TYPE),
                scheduled_start: payload.scheduled_start,
                scheduled_end: payload.scheduled_end,
                time_zone: or_default(&payload.time_zone, DEFAULT_TIME_ZONE),
                meeting_link_or_location: payload.meeting_link_or_location.trim().to_string(),
                notes: payload.notes.trim().to_string(),
                created_at: now(),
            })
            .await?;

        info!(
            interview_id = interview.id,
            application_id = application.id,
            admin_id,
            "interview scheduled"
        );

        let job_title = self
            .jobs
            .find_job(application.job_posting_id)
            .await
            .ok()
            .flatten()
            .map(|job| job.title)
            .unwrap_or_default();
        let invite = OutboundMessage::new(
            format!("Interview scheduled: {}", job_title),
            format!(
                "Interview on {} UTC ({}).",
                interview.scheduled_start.format("%Y-%m-%d %H:%M"),
                interview.interview_type
            ),
            NotificationType::InterviewScheduled,
        )
        .for_job(application.job_posting_id)
        .with_email()
        .with_sms();
        absorb(
            self.notifications.notify(application.candidate_id, &invite).await,
            "candidate notification",
            interview.id,
        );

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Interview", "Schedule", "InterviewSchedule")
                        .actor(admin_id)
                        .related(interview.id)
                        .details(format!(
                            "Scheduled interview for application #{}.",
                            application.id
                        ))
                        .notify_admins(),
                )
                .await,
            "audit",
            interview.id,
        );

        self.hydrate(interview, &mut HashMap::new()).await
    }

    /// Only the owning admin can update an interview; anyone else gets
    /// `false`. Blank notes keep the existing ones.
    pub async fn update_status(&self, admin_id: i64, payload: UpdateInterviewStatusPayload) -> Result<bool> {
        require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only active admin users can update interviews.",
        )
        .await?;
        payload.validate()?;

        let status: InterviewStatus = payload
            .status
            .parse()
            .map_err(Error::InvalidInterviewStatus)?;

        let Some(interview) = self
            .interviews
            .find_interview(payload.interview_id)
            .await?
            .filter(|interview| interview.admin_id == admin_id)
        else {
            return Ok(false);
        };

        let notes = Some(payload.notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        if !self
            .interviews
            .update_interview_status(interview.id, status, notes, now())
            .await?
        {
            return Ok(false);
        }

        info!(interview_id = interview.id, admin_id, %status, "interview status updated");

        if let Ok(Some(application)) = self
            .applications
            .find_application(interview.job_application_id)
            .await
        {
            let update = OutboundMessage::new(
                "Interview update",
                format!("Your interview status was updated to '{}'.", status),
                NotificationType::InterviewUpdated,
            )
            .for_job(application.job_posting_id)
            .with_email();
            absorb(
                self.notifications.notify(application.candidate_id, &update).await,
                "candidate notification",
                interview.id,
            );
        }

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Interview", "Update", "InterviewSchedule")
                        .actor(admin_id)
                        .related(interview.id)
                        .details(format!("Interview #{} updated to {}.", interview.id, status))
                        .notify_admins(),
                )
                .await,
            "audit",
            interview.id,
        );

        Ok(true)
    }

    async fn hydrate_all(&self, interviews: Vec<InterviewSchedule>) -> Result<Vec<InterviewView>> {
        let mut names = HashMap::new();
        let mut views = Vec::with_capacity(interviews.len());
        for interview in interviews {
            views.push(self.hydrate(interview, &mut names).await?);
        }
        Ok(views)
    }

    async fn hydrate(
        &self,
        interview: InterviewSchedule,
        names: &mut HashMap<i64, String>,
    ) -> Result<InterviewView> {
        let candidate_name = self.display_name(interview.candidate_id, names).await?;
        let admin_name = self.display_name(interview.admin_id, names).await?;
        Ok(InterviewView {
            id: interview.id,
            job_application_id: interview.job_application_id,
            candidate_id: interview.candidate_id,
            candidate_name,
            admin_id: interview.admin_id,
            admin_name,
            interview_type: interview.interview_type,
            status: interview.status,
            scheduled_start: interview.scheduled_start,
            scheduled_end: interview.scheduled_end,
            time_zone: interview.time_zone,
            meeting_link_or_location: interview.meeting_link_or_location,
            notes: interview.notes,
        })
    }

    async fn display_name(&self, user_id: i64, names: &mut HashMap<i64, String>) -> Result<String> {
        if let Some(name) = names.get(&user_id) {
            return Ok(name.clone());
        }
        let name = self
            .users
            .find_user(user_id)
            .await?
            .map(|u| u.full_name())
            .unwrap_or_default();
        names.insert(user_id, name.clone());
        Ok(name)
    }
}

fn or_default(value: &str, default: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}
