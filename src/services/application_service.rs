//! Application lifecycle: apply, move through stages, annotate.
//!
//! Every mutation commits its primary write first; audit and notification
//! fan-out run afterwards and cannot undo or fail the committed change.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::dto::application_dto::{
    ApplyForJobPayload, CreateFollowUpNotePayload, FollowUpNoteView, JobApplicationView,
    UpdateStagePayload,
};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationFilter, ApplicationStage, JobApplication, NewFollowUpNote, NewJobApplication,
};
use crate::models::notification::NotificationType;
use crate::models::user::{User, UserRole};
use crate::repository::{ApplicationRepository, CvRepository, JobRepository, UserDirectory};
use crate::services::audit_service::{AuditEntry, AuditService};
use crate::services::cv_service;
use crate::services::guard::{absorb, require_active};
use crate::services::matching_service::{no_cv_scorecard, scorecard_for};
use crate::services::notification_service::{NotificationService, OutboundMessage};
use crate::utils::time::now;

#[derive(Clone)]
pub struct ApplicationService {
    users: Arc<dyn UserDirectory>,
    cvs: Arc<dyn CvRepository>,
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    audit: AuditService,
    notifications: NotificationService,
}

impl ApplicationService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        cvs: Arc<dyn CvRepository>,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            users,
            cvs,
            jobs,
            applications,
            audit,
            notifications,
        }
    }

    /// Scores and files an application for an open job.
    ///
    /// Uses the named CV when given (it must belong to the candidate), else
    /// the candidate's newest CV, else the fixed no-CV assessment.
    pub async fn apply(&self, candidate_id: i64, payload: ApplyForJobPayload) -> Result<JobApplicationView> {
        let candidate = require_active(
            self.users.as_ref(),
            candidate_id,
            UserRole::Candidate,
            "Only candidate users can apply for jobs.",
        )
        .await?;
        payload.validate()?;

        let job = self
            .jobs
            .find_job(payload.job_posting_id)
            .await?
            .filter(|job| job.is_open)
            .ok_or(Error::JobUnavailable)?;

        if self
            .applications
            .application_exists(candidate_id, job.id)
            .await?
        {
            return Err(Error::AlreadyApplied);
        }

        let cv = match payload.cv_profile_id {
            Some(cv_id) => Some(
                self.cvs
                    .find_cv_profile(cv_id)
                    .await?
                    .filter(|cv| cv.candidate_id == candidate_id)
                    .ok_or_else(|| {
                        Error::NotFound("CV profile not found for this candidate.".to_string())
                    })?,
            ),
            None => self.cvs.latest_cv_profile(candidate_id).await?,
        };

        let submitted_at = now();
        let scorecard = match cv.as_ref() {
            Some(cv) => scorecard_for(&cv_service::analyze(cv, &job), submitted_at),
            None => no_cv_scorecard(submitted_at),
        };

        let application = self
            .applications
            .insert_application(NewJobApplication {
                job_posting_id: job.id,
                candidate_id,
                cv_profile_id: cv.as_ref().map(|cv| cv.id),
                cover_letter: payload.cover_letter.trim().to_string(),
                strengths_summary: scorecard.strengths_breakdown.clone(),
                weaknesses_summary: scorecard.gaps_breakdown.clone(),
                match_score: scorecard.overall_score,
                submitted_at,
                scorecard,
            })
            .await?;

        info!(
            application_id = application.id,
            candidate_id,
            job_id = job.id,
            match_score = %application.match_score,
            "application submitted"
        );

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Application", "Apply", "JobApplication")
                        .actor(candidate_id)
                        .related(application.id)
                        .details(format!("{} applied for '{}'.", candidate.email, job.title))
                        .notify_admins(),
                )
                .await,
            "audit",
            application.id,
        );

        let confirmation = OutboundMessage::new(
            "Application submitted",
            format!("Your application for '{}' was submitted successfully.", job.title),
            NotificationType::ApplicationSubmitted,
        )
        .for_job(job.id)
        .with_email()
        .with_sms();
        absorb(
            self.notifications.notify(candidate_id, &confirmation).await,
            "candidate notification",
            application.id,
        );

        let alert = OutboundMessage::new(
            "New applicant",
            format!("{} applied for '{}'.", candidate.full_name(), job.title),
            NotificationType::ApplicationSubmitted,
        )
        .for_job(job.id)
        .with_email();
        match self.users.list_active_admins().await {
            Ok(admin_ids) => {
                for admin_id in admin_ids {
                    absorb(
                        self.notifications.notify(admin_id, &alert).await,
                        "admin notification",
                        application.id,
                    );
                }
            }
            Err(e) => warn!(application_id = application.id, error = %e, "could not list admins"),
        }

        match self.hydrate(application.clone()).await {
            Ok(view) => Ok(view),
            Err(e) => {
                warn!(application_id = application.id, error = %e, "returning unhydrated application");
                Ok(application_view(application, job.title, Some(&candidate), Vec::new()))
            }
        }
    }

    pub async fn get_my(&self, candidate_id: i64) -> Result<Vec<JobApplicationView>> {
        self.list(ApplicationFilter::for_candidate(candidate_id)).await
    }

    pub async fn get_all(&self) -> Result<Vec<JobApplicationView>> {
        self.list(ApplicationFilter::all()).await
    }

    pub async fn get_for_job(&self, job_posting_id: i64) -> Result<Vec<JobApplicationView>> {
        self.list(ApplicationFilter::for_job(job_posting_id)).await
    }

    /// Sets any stage directly; no ordering between stages is enforced.
    /// `false` when the application does not exist.
    pub async fn update_stage(&self, admin_id: i64, payload: UpdateStagePayload) -> Result<bool> {
        require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only admin users can update application stages.",
        )
        .await?;
        payload.validate()?;

        let stage: ApplicationStage = payload.stage.parse().map_err(Error::InvalidStage)?;

        let Some(application) = self
            .applications
            .find_application(payload.application_id)
            .await?
        else {
            return Ok(false);
        };

        if !self
            .applications
            .update_application_stage(application.id, stage, now())
            .await?
        {
            return Ok(false);
        }

        info!(application_id = application.id, admin_id, %stage, "application stage changed");

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Application", "UpdateStage", "JobApplication")
                        .actor(admin_id)
                        .related(application.id)
                        .details(format!(
                            "Stage changed to {} for application #{}.",
                            stage, application.id
                        ))
                        .notify_admins(),
                )
                .await,
            "audit",
            application.id,
        );

        let job_title = self.job_title(application.job_posting_id).await;
        let update = OutboundMessage::new(
            "Application status updated",
            format!("Your application for '{}' moved to '{}'.", job_title, stage),
            NotificationType::ApplicationStatusUpdated,
        )
        .for_job(application.job_posting_id)
        .with_email()
        .with_sms();
        absorb(
            self.notifications.notify(application.candidate_id, &update).await,
            "candidate notification",
            application.id,
        );

        Ok(true)
    }

    pub async fn add_follow_up_note(
        &self,
        admin_id: i64,
        payload: CreateFollowUpNotePayload,
    ) -> Result<FollowUpNoteView> {
        let admin = require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only admin users can add follow-up notes.",
        )
        .await?;
        payload.validate()?;

        let note_text = payload.note.trim();
        if note_text.is_empty() {
            return Err(Error::Validation("Note cannot be blank.".to_string()));
        }

        let application = self
            .applications
            .find_application(payload.application_id)
            .await?
            .ok_or_else(|| Error::NotFound("Application not found.".to_string()))?;

        let note = self
            .applications
            .insert_follow_up_note(NewFollowUpNote {
                job_application_id: application.id,
                admin_id,
                note: note_text.to_string(),
                created_at: now(),
            })
            .await?;

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Application", "FollowUp", "JobApplication")
                        .actor(admin_id)
                        .related(application.id)
                        .details(format!("Follow-up note added on application #{}.", application.id))
                        .notify_admins(),
                )
                .await,
            "audit",
            application.id,
        );

        let job_title = self.job_title(application.job_posting_id).await;
        let heads_up = OutboundMessage::new(
            "Application follow-up",
            format!(
                "A follow-up note was added for your application to '{}'.",
                job_title
            ),
            NotificationType::FollowUpNoteAdded,
        )
        .for_job(application.job_posting_id)
        .with_email();
        absorb(
            self.notifications.notify(application.candidate_id, &heads_up).await,
            "candidate notification",
            application.id,
        );

        Ok(FollowUpNoteView {
            id: note.id,
            admin_id: admin.id,
            admin_name: admin.full_name(),
            note: note.note,
            created_at: note.created_at,
        })
    }

    async fn list(&self, filter: ApplicationFilter) -> Result<Vec<JobApplicationView>> {
        let applications = self.applications.list_applications(filter).await?;
        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            views.push(self.hydrate(application).await?);
        }
        Ok(views)
    }

    async fn job_title(&self, job_posting_id: i64) -> String {
        match self.jobs.find_job(job_posting_id).await {
            Ok(job) => job.map(|j| j.title).unwrap_or_default(),
            Err(e) => {
                warn!(job_id = job_posting_id, error = %e, "job lookup failed");
                String::new()
            }
        }
    }

    async fn hydrate(&self, application: JobApplication) -> Result<JobApplicationView> {
        let job_title = self
            .jobs
            .find_job(application.job_posting_id)
            .await?
            .map(|job| job.title)
            .unwrap_or_default();
        let candidate = self.users.find_user(application.candidate_id).await?;

        let mut admins: HashMap<i64, Option<User>> = HashMap::new();
        let mut notes = Vec::new();
        for note in self.applications.list_follow_up_notes(application.id).await? {
            if !admins.contains_key(&note.admin_id) {
                let admin = self.users.find_user(note.admin_id).await?;
                admins.insert(note.admin_id, admin);
            }
            let admin_name = admins
                .get(&note.admin_id)
                .and_then(|admin| admin.as_ref())
                .map(User::full_name)
                .unwrap_or_default();
            notes.push(FollowUpNoteView {
                id: note.id,
                admin_id: note.admin_id,
                admin_name,
                note: note.note,
                created_at: note.created_at,
            });
        }

        Ok(application_view(application, job_title, candidate.as_ref(), notes))
    }
}

fn application_view(
    application: JobApplication,
    job_title: String,
    candidate: Option<&User>,
    follow_up_notes: Vec<FollowUpNoteView>,
) -> JobApplicationView {
    let card = application.scorecard;
    JobApplicationView {
        id: application.id,
        job_posting_id: application.job_posting_id,
        job_title,
        candidate_id: application.candidate_id,
        candidate_name: candidate.map(User::full_name).unwrap_or_default(),
        candidate_email: candidate.map(|c| c.email.clone()).unwrap_or_default(),
        cv_profile_id: application.cv_profile_id,
        stage: application.stage,
        cover_letter: application.cover_letter,
        strengths_summary: application.strengths_summary,
        weaknesses_summary: application.weaknesses_summary,
        match_score: application.match_score,
        skill_match_score: card.skill_match_score,
        experience_score: card.experience_score,
        education_score: card.education_score,
        certifications_score: card.certifications_score,
        overall_score: card.overall_score,
        submitted_at: application.submitted_at,
        follow_up_notes,
    }
}
