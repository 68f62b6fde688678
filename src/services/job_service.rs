use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::dto::job_dto::{CreateJobPayload, UpdateJobPayload};
use crate::error::{Error, Result};
use crate::models::job_posting::{JobPosting, NewJobPosting};
use crate::models::notification::NotificationType;
use crate::models::user::UserRole;
use crate::repository::{JobRepository, UserDirectory};
use crate::services::audit_service::{AuditEntry, AuditService};
use crate::services::guard::{absorb, require_active};
use crate::services::notification_service::{NotificationService, OutboundMessage};
use crate::services::skill_extraction::normalize_skills;
use crate::utils::time::now;

#[derive(Clone)]
pub struct JobService {
    users: Arc<dyn UserDirectory>,
    jobs: Arc<dyn JobRepository>,
    audit: AuditService,
    notifications: NotificationService,
}

impl JobService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        jobs: Arc<dyn JobRepository>,
        audit: AuditService,
        notifications: NotificationService,
    ) -> Self {
        Self {
            users,
            jobs,
            audit,
            notifications,
        }
    }

    pub async fn open_jobs(&self) -> Result<Vec<JobPosting>> {
        self.jobs.list_jobs(true).await
    }

    pub async fn all_jobs(&self) -> Result<Vec<JobPosting>> {
        self.jobs.list_jobs(false).await
    }

    pub async fn get(&self, id: i64) -> Result<Option<JobPosting>> {
        self.jobs.find_job(id).await
    }

    /// Posts a job and announces it to every active candidate.
    pub async fn create(&self, admin_id: i64, payload: CreateJobPayload) -> Result<JobPosting> {
        let admin = require_active(
            self.users.as_ref(),
            admin_id,
            UserRole::Admin,
            "Only active admin users can create jobs.",
        )
        .await?;
        payload.validate()?;
        check_salary_band(payload.salary_min, payload.salary_max)?;

        let job = self
            .jobs
            .insert_job(NewJobPosting {
                company: payload.company.trim().to_string(),
                posted_by_admin_id: admin.id,
                title: payload.title.trim().to_string(),
                description: payload.description.trim().to_string(),
                location: payload.location.trim().to_string(),
                employment_type: payload.employment_type.trim().to_string(),
                experience_level: payload.experience_level.trim().to_string(),
                required_skills: normalize_skills(&payload.required_skills),
                salary_min: payload.salary_min,
                salary_max: payload.salary_max,
                created_at: now(),
            })
            .await?;

        info!(job_id = job.id, admin_id, "job posted");

        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Job", "Create", "JobPosting")
                        .actor(admin_id)
                        .related(job.id)
                        .details(format!("Posted job '{}' in {}.", job.title, job.location))
                        .notify_admins(),
                )
                .await,
            "audit",
            job.id,
        );

        let announcement = OutboundMessage::new(
            format!("New job posted: {}", job.title),
            format!(
                "A new opening is now available in {}. Check and apply from your dashboard.",
                job.location
            ),
            NotificationType::JobPosted,
        )
        .for_job(job.id)
        .with_email()
        .with_sms();
        absorb(
            self.notifications.broadcast_to_candidates(&announcement).await,
            "broadcast",
            job.id,
        );

        Ok(job)
    }

    /// Applies the non-blank fields of `payload`. `false` when the job is gone.
    pub async fn update(&self, id: i64, payload: UpdateJobPayload) -> Result<bool> {
        payload.validate()?;
        let Some(mut job) = self.jobs.find_job(id).await? else {
            return Ok(false);
        };

        overwrite_if_present(&mut job.company, payload.company.as_deref());
        overwrite_if_present(&mut job.title, payload.title.as_deref());
        overwrite_if_present(&mut job.description, payload.description.as_deref());
        overwrite_if_present(&mut job.location, payload.location.as_deref());
        overwrite_if_present(&mut job.employment_type, payload.employment_type.as_deref());
        overwrite_if_present(&mut job.experience_level, payload.experience_level.as_deref());

        if let Some(skills) = payload.required_skills.as_ref() {
            job.required_skills = normalize_skills(skills);
        }
        if payload.salary_min.is_some() {
            job.salary_min = payload.salary_min;
        }
        if payload.salary_max.is_some() {
            job.salary_max = payload.salary_max;
        }
        if let Some(is_open) = payload.is_open {
            job.is_open = is_open;
        }
        check_salary_band(job.salary_min, job.salary_max)?;

        job.updated_at = now();
        if !self.jobs.update_job(&job).await? {
            return Ok(false);
        }

        self.record_job_event(&job, "Update", format!("Updated job '{}'.", job.title))
            .await;
        Ok(true)
    }

    /// Stops accepting applications; existing ones are kept.
    pub async fn close(&self, id: i64) -> Result<bool> {
        let Some(mut job) = self.jobs.find_job(id).await? else {
            return Ok(false);
        };

        job.is_open = false;
        job.updated_at = now();
        if !self.jobs.update_job(&job).await? {
            return Ok(false);
        }

        self.record_job_event(&job, "Close", format!("Closed job '{}'.", job.title))
            .await;
        Ok(true)
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        let Some(job) = self.jobs.find_job(id).await? else {
            return Ok(false);
        };

        if !self.jobs.delete_job(id).await? {
            return Ok(false);
        }

        info!(job_id = id, "job deleted");
        self.record_job_event(&job, "Delete", format!("Deleted job '{}'.", job.title))
            .await;
        Ok(true)
    }

    async fn record_job_event(&self, job: &JobPosting, action: &str, details: String) {
        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("Job", action, "JobPosting")
                        .actor(job.posted_by_admin_id)
                        .related(job.id)
                        .details(details)
                        .notify_admins(),
                )
                .await,
            "audit",
            job.id,
        );
    }
}

fn overwrite_if_present(field: &mut String, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        *field = value.to_string();
    }
}

fn check_salary_band(min: Option<Decimal>, max: Option<Decimal>) -> Result<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(Error::Validation(
            "Minimum salary cannot exceed maximum salary.".to_string(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_updates_keep_existing_text() {
        let mut title = "Backend Engineer".to_string();
        overwrite_if_present(&mut title, Some("   "));
        assert_eq!(title, "Backend Engineer");
        overwrite_if_present(&mut title, None);
        assert_eq!(title, "Backend Engineer");
        overwrite_if_present(&mut title, Some(" Platform Engineer "));
        assert_eq!(title, "Platform Engineer");
    }

    #[test]
    fn inverted_salary_band_is_rejected() {
        assert!(check_salary_band(Some(Decimal::from(10)), Some(Decimal::from(5))).is_err());
        assert!(check_salary_band(Some(Decimal::from(5)), Some(Decimal::from(5))).is_ok());
        assert!(check_salary_band(None, Some(Decimal::from(5))).is_ok());
    }
}
