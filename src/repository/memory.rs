use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::{
    ApplicationRepository, AuditRepository, CvRepository, InterviewRepository, JobRepository,
    NotificationRepository, UserDirectory,
};
use crate::error::{Error, Result};
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
use crate::models::user::{NewUser, User, UserRole};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    cv_profiles: BTreeMap<i64, CvProfile>,
    jobs: BTreeMap<i64, JobPosting>,
    applications: BTreeMap<i64, JobApplication>,
    follow_up_notes: BTreeMap<i64, FollowUpNote>,
    interviews: BTreeMap<i64, InterviewSchedule>,
    audit_events: BTreeMap<i64, AuditEvent>,
    notifications: BTreeMap<i64, Notification>,
    deliveries: BTreeMap<i64, NotificationDelivery>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn active_users_with_role(&self, role: UserRole) -> Vec<i64> {
        self.users
            .values()
            .filter(|u| u.is_active && u.role == role)
            .map(|u| u.id)
            .collect()
    }
}

/// In-process store. Every trait method runs under a single lock, which gives
/// the same all-or-nothing writes the Postgres transactions do.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Users normally arrive through the authentication subsystem; this is the
    /// in-process stand-in for that registration path.
    pub async fn seed_user(&self, user: NewUser) -> User {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let record = User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone_number: user.phone_number,
            role: user.role,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(id, record.clone());
        record
    }

    pub async fn set_user_active(&self, id: i64, active: bool) -> bool {
        let mut tables = self.tables.lock().await;
        match tables.users.get_mut(&id) {
            Some(user) => {
                user.is_active = active;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (DateTime<Utc>, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn list_active_admins(&self) -> Result<Vec<i64>> {
        Ok(self.tables.lock().await.active_users_with_role(UserRole::Admin))
    }

    async fn list_active_candidates(&self) -> Result<Vec<i64>> {
        Ok(self
            .tables
            .lock()
            .await
            .active_users_with_role(UserRole::Candidate))
    }
}

#[async_trait]
impl CvRepository for MemoryStore {
    async fn insert_cv_profile(&self, cv: NewCvProfile) -> Result<CvProfile> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = CvProfile {
            id,
            candidate_id: cv.candidate_id,
            original_file_name: cv.original_file_name,
            stored_file_path: cv.stored_file_path,
            mime_type: cv.mime_type,
            content_text: cv.content_text,
            skills: cv.skills,
            education_summary: cv.education_summary,
            years_of_experience: cv.years_of_experience,
            certifications_summary: cv.certifications_summary,
            created_at: cv.created_at,
        };
        tables.cv_profiles.insert(id, record.clone());
        Ok(record)
    }

    async fn find_cv_profile(&self, id: i64) -> Result<Option<CvProfile>> {
        Ok(self.tables.lock().await.cv_profiles.get(&id).cloned())
    }

    async fn latest_cv_profile(&self, candidate_id: i64) -> Result<Option<CvProfile>> {
        Ok(self.list_cv_profiles(candidate_id).await?.into_iter().next())
    }

    async fn list_cv_profiles(&self, candidate_id: i64) -> Result<Vec<CvProfile>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<CvProfile> = tables
            .cv_profiles
            .values()
            .filter(|cv| cv.candidate_id == candidate_id)
            .cloned()
            .collect();
        newest_first(&mut items, |cv| (cv.created_at, cv.id));
        Ok(items)
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = JobPosting {
            id,
            company: job.company,
            posted_by_admin_id: job.posted_by_admin_id,
            title: job.title,
            description: job.description,
            location: job.location,
            employment_type: job.employment_type,
            experience_level: job.experience_level,
            required_skills: job.required_skills,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            is_open: true,
            created_at: job.created_at,
            updated_at: job.created_at,
        };
        tables.jobs.insert(id, record.clone());
        Ok(record)
    }

    async fn find_job(&self, id: i64) -> Result<Option<JobPosting>> {
        Ok(self.tables.lock().await.jobs.get(&id).cloned())
    }

    async fn list_jobs(&self, open_only: bool) -> Result<Vec<JobPosting>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<JobPosting> = tables
            .jobs
            .values()
            .filter(|job| !open_only || job.is_open)
            .cloned()
            .collect();
        newest_first(&mut items, |job| (job.created_at, job.id));
        Ok(items)
    }

    async fn update_job(&self, job: &JobPosting) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.jobs.get_mut(&job.id) {
            Some(existing) => {
                *existing = job.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_job(&self, id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.jobs.remove(&id).is_none() {
            return Ok(false);
        }

        let removed: Vec<i64> = tables
            .applications
            .values()
            .filter(|app| app.job_posting_id == id)
            .map(|app| app.id)
            .collect();
        for app_id in &removed {
            tables.applications.remove(app_id);
        }
        tables
            .follow_up_notes
            .retain(|_, note| !removed.contains(&note.job_application_id));
        tables
            .interviews
            .retain(|_, interview| !removed.contains(&interview.job_application_id));
        for notification in tables.notifications.values_mut() {
            if notification.related_job_posting_id == Some(id) {
                notification.related_job_posting_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn application_exists(&self, candidate_id: i64, job_posting_id: i64) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .applications
            .values()
            .any(|app| app.candidate_id == candidate_id && app.job_posting_id == job_posting_id))
    }

    async fn insert_application(&self, application: NewJobApplication) -> Result<JobApplication> {
        let mut tables = self.tables.lock().await;
        let duplicate = tables.applications.values().any(|app| {
            app.candidate_id == application.candidate_id
                && app.job_posting_id == application.job_posting_id
        });
        if duplicate {
            return Err(Error::AlreadyApplied);
        }

        let id = tables.next_id();
        let record = JobApplication {
            id,
            job_posting_id: application.job_posting_id,
            candidate_id: application.candidate_id,
            cv_profile_id: application.cv_profile_id,
            cover_letter: application.cover_letter,
            strengths_summary: application.strengths_summary,
            weaknesses_summary: application.weaknesses_summary,
            match_score: application.match_score,
            stage: ApplicationStage::Applied,
            submitted_at: application.submitted_at,
            updated_at: application.submitted_at,
            scorecard: application.scorecard,
        };
        tables.applications.insert(id, record.clone());
        Ok(record)
    }

    async fn find_application(&self, id: i64) -> Result<Option<JobApplication>> {
        Ok(self.tables.lock().await.applications.get(&id).cloned())
    }

    async fn list_applications(&self, filter: ApplicationFilter) -> Result<Vec<JobApplication>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<JobApplication> = tables
            .applications
            .values()
            .filter(|app| filter.matches(app))
            .cloned()
            .collect();
        newest_first(&mut items, |app| (app.submitted_at, app.id));
        Ok(items)
    }

    async fn update_application_stage(
        &self,
        id: i64,
        stage: ApplicationStage,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.applications.get_mut(&id) {
            Some(app) => {
                app.stage = stage;
                app.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_follow_up_note(&self, note: NewFollowUpNote) -> Result<FollowUpNote> {
        let mut tables = self.tables.lock().await;
        if !tables.applications.contains_key(&note.job_application_id) {
            return Err(Error::NotFound("Application not found.".to_string()));
        }
        let id = tables.next_id();
        let record = FollowUpNote {
            id,
            job_application_id: note.job_application_id,
            admin_id: note.admin_id,
            note: note.note,
            created_at: note.created_at,
        };
        tables.follow_up_notes.insert(id, record.clone());
        Ok(record)
    }

    async fn list_follow_up_notes(&self, application_id: i64) -> Result<Vec<FollowUpNote>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<FollowUpNote> = tables
            .follow_up_notes
            .values()
            .filter(|note| note.job_application_id == application_id)
            .cloned()
            .collect();
        newest_first(&mut items, |note| (note.created_at, note.id));
        Ok(items)
    }
}

#[async_trait]
impl InterviewRepository for MemoryStore {
    async fn schedule_interview(&self, interview: NewInterviewSchedule) -> Result<InterviewSchedule> {
        let mut tables = self.tables.lock().await;
        if !tables.applications.contains_key(&interview.job_application_id) {
            return Err(Error::NotFound("Application not found.".to_string()));
        }

        let id = tables.next_id();
        let record = InterviewSchedule {
            id,
            job_application_id: interview.job_application_id,
            candidate_id: interview.candidate_id,
            admin_id: interview.admin_id,
            interview_type: interview.interview_type,
            status: InterviewStatus::Scheduled,
            scheduled_start: interview.scheduled_start,
            scheduled_end: interview.scheduled_end,
            time_zone: interview.time_zone,
            meeting_link_or_location: interview.meeting_link_or_location,
            notes: interview.notes,
            created_at: interview.created_at,
            updated_at: interview.created_at,
        };
        tables.interviews.insert(id, record.clone());

        if let Some(app) = tables.applications.get_mut(&record.job_application_id) {
            app.stage = ApplicationStage::InterviewScheduled;
            app.updated_at = record.created_at;
        }
        Ok(record)
    }

    async fn find_interview(&self, id: i64) -> Result<Option<InterviewSchedule>> {
        Ok(self.tables.lock().await.interviews.get(&id).cloned())
    }

    async fn update_interview_status(
        &self,
        id: i64,
        status: InterviewStatus,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.interviews.get_mut(&id) {
            Some(interview) => {
                interview.status = status;
                if let Some(notes) = notes {
                    interview.notes = notes;
                }
                interview.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_interviews(&self, filter: InterviewFilter) -> Result<Vec<InterviewSchedule>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<InterviewSchedule> = tables
            .interviews
            .values()
            .filter(|interview| filter.matches(interview))
            .cloned()
            .collect();
        newest_first(&mut items, |interview| (interview.scheduled_start, interview.id));
        Ok(items)
    }
}

#[async_trait]
impl AuditRepository for MemoryStore {
    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<AuditEvent> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = AuditEvent {
            id,
            actor_user_id: event.actor_user_id,
            source: event.source,
            action: event.action,
            category: event.category,
            related_entity_id: event.related_entity_id,
            details: event.details,
            created_at: event.created_at,
        };
        tables.audit_events.insert(id, record.clone());
        Ok(record)
    }

    async fn list_audit_events(&self, actor_user_id: Option<i64>, limit: i64) -> Result<Vec<AuditEvent>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<AuditEvent> = tables
            .audit_events
            .values()
            .filter(|event| actor_user_id.map_or(true, |id| event.actor_user_id == Some(id)))
            .cloned()
            .collect();
        newest_first(&mut items, |event| (event.created_at, event.id));
        items.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(items)
    }
}

#[async_trait]
impl NotificationRepository for MemoryStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let record = Notification {
            id,
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            notification_type: notification.notification_type,
            related_job_posting_id: notification.related_job_posting_id,
            is_read: false,
            created_at: notification.created_at,
        };
        tables.notifications.insert(id, record.clone());
        Ok(record)
    }

    async fn insert_deliveries(
        &self,
        deliveries: Vec<NewNotificationDelivery>,
    ) -> Result<Vec<NotificationDelivery>> {
        let mut tables = self.tables.lock().await;
        if let Some(orphan) = deliveries
            .iter()
            .find(|d| !tables.notifications.contains_key(&d.notification_id))
        {
            return Err(Error::NotFound(format!(
                "Notification {} not found.",
                orphan.notification_id
            )));
        }

        let mut stored = Vec::with_capacity(deliveries.len());
        for delivery in deliveries {
            let id = tables.next_id();
            let record = NotificationDelivery {
                id,
                notification_id: delivery.notification_id,
                channel: delivery.channel,
                destination: delivery.destination,
                is_success: delivery.is_success,
                provider_response: delivery.provider_response,
                sent_at: delivery.sent_at,
            };
            tables.deliveries.insert(id, record.clone());
            stored.push(record);
        }
        Ok(stored)
    }

    async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut items, |n| (n.created_at, n.id));
        Ok(items)
    }

    async fn list_deliveries(&self, notification_id: i64) -> Result<Vec<NotificationDelivery>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .deliveries
            .values()
            .filter(|d| d.notification_id == notification_id)
            .cloned()
            .collect())
    }

    async fn count_unread(&self, user_id: i64) -> Result<i64> {
        let tables = self.tables.lock().await;
        let count = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count();
        Ok(count as i64)
    }

    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables.notifications.get_mut(&notification_id) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let mut tables = self.tables.lock().await;
        let mut updated = 0;
        for n in tables
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }
}
