use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use super::{
    skills_from_csv, skills_to_csv, ApplicationRepository, AuditRepository, CvRepository,
    InterviewRepository, JobRepository, NotificationRepository, UserDirectory,
};
use crate::error::{Error, Result};
use crate::models::application::{
    ApplicationFilter, ApplicationStage, FollowUpNote, JobApplication, NewFollowUpNote,
    NewJobApplication, Scorecard,
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

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn corrupt(column: &str, value: String) -> Error {
    Error::Internal(format!("Unexpected value '{}' in column {}", value, column))
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = Error;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            role: row.role.parse().map_err(|_| corrupt("users.role", row.role))?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct CvProfileRow {
    id: i64,
    candidate_id: i64,
    original_file_name: String,
    stored_file_path: String,
    mime_type: String,
    content_text: String,
    skills_csv: String,
    education_summary: String,
    years_of_experience: i32,
    certifications_summary: String,
    created_at: DateTime<Utc>,
}

impl From<CvProfileRow> for CvProfile {
    fn from(row: CvProfileRow) -> Self {
        CvProfile {
            id: row.id,
            candidate_id: row.candidate_id,
            original_file_name: row.original_file_name,
            stored_file_path: row.stored_file_path,
            mime_type: row.mime_type,
            content_text: row.content_text,
            skills: skills_from_csv(&row.skills_csv),
            education_summary: row.education_summary,
            years_of_experience: row.years_of_experience,
            certifications_summary: row.certifications_summary,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct JobPostingRow {
    id: i64,
    company: String,
    posted_by_admin_id: i64,
    title: String,
    description: String,
    location: String,
    employment_type: String,
    experience_level: String,
    required_skills_csv: String,
    salary_min: Option<Decimal>,
    salary_max: Option<Decimal>,
    is_open: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<JobPostingRow> for JobPosting {
    fn from(row: JobPostingRow) -> Self {
        JobPosting {
            id: row.id,
            company: row.company,
            posted_by_admin_id: row.posted_by_admin_id,
            title: row.title,
            description: row.description,
            location: row.location,
            employment_type: row.employment_type,
            experience_level: row.experience_level,
            required_skills: skills_from_csv(&row.required_skills_csv),
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            is_open: row.is_open,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ApplicationRow {
    id: i64,
    job_posting_id: i64,
    candidate_id: i64,
    cv_profile_id: Option<i64>,
    cover_letter: String,
    strengths_summary: String,
    weaknesses_summary: String,
    match_score: Decimal,
    stage: String,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    skill_match_score: Decimal,
    experience_score: Decimal,
    education_score: Decimal,
    certifications_score: Decimal,
    overall_score: Decimal,
    strengths_breakdown: String,
    gaps_breakdown: String,
    generated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for JobApplication {
    type Error = Error;

    fn try_from(row: ApplicationRow) -> Result<Self> {
        let stage: ApplicationStage = row
            .stage
            .parse()
            .map_err(|value| corrupt("job_applications.stage", value))?;
        Ok(JobApplication {
            id: row.id,
            job_posting_id: row.job_posting_id,
            candidate_id: row.candidate_id,
            cv_profile_id: row.cv_profile_id,
            cover_letter: row.cover_letter,
            strengths_summary: row.strengths_summary,
            weaknesses_summary: row.weaknesses_summary,
            match_score: row.match_score,
            stage,
            submitted_at: row.submitted_at,
            updated_at: row.updated_at,
            scorecard: Scorecard {
                skill_match_score: row.skill_match_score,
                experience_score: row.experience_score,
                education_score: row.education_score,
                certifications_score: row.certifications_score,
                overall_score: row.overall_score,
                strengths_breakdown: row.strengths_breakdown,
                gaps_breakdown: row.gaps_breakdown,
                generated_at: row.generated_at,
            },
        })
    }
}

const APPLICATION_SELECT: &str = r#"
    SELECT a.id, a.job_posting_id, a.candidate_id, a.cv_profile_id, a.cover_letter,
           a.strengths_summary, a.weaknesses_summary, a.match_score, a.stage,
           a.submitted_at, a.updated_at,
           s.skill_match_score, s.experience_score, s.education_score,
           s.certifications_score, s.overall_score, s.strengths_breakdown,
           s.gaps_breakdown, s.generated_at
    FROM job_applications a
    JOIN application_scorecards s ON s.job_application_id = a.id
"#;

#[derive(FromRow)]
struct InterviewRow {
    id: i64,
    job_application_id: i64,
    candidate_id: i64,
    admin_id: i64,
    interview_type: String,
    status: String,
    scheduled_start: DateTime<Utc>,
    scheduled_end: DateTime<Utc>,
    time_zone: String,
    meeting_link_or_location: String,
    notes: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for InterviewSchedule {
    type Error = Error;

    fn try_from(row: InterviewRow) -> Result<Self> {
        let status: InterviewStatus = row
            .status
            .parse()
            .map_err(|value| corrupt("interview_schedules.status", value))?;
        Ok(InterviewSchedule {
            id: row.id,
            job_application_id: row.job_application_id,
            candidate_id: row.candidate_id,
            admin_id: row.admin_id,
            interview_type: row.interview_type,
            status,
            scheduled_start: row.scheduled_start,
            scheduled_end: row.scheduled_end,
            time_zone: row.time_zone,
            meeting_link_or_location: row.meeting_link_or_location,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct NotificationRow {
    id: i64,
    user_id: i64,
    title: String,
    message: String,
    notification_type: String,
    related_job_posting_id: Option<i64>,
    is_read: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = Error;

    fn try_from(row: NotificationRow) -> Result<Self> {
        Ok(Notification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            notification_type: row
                .notification_type
                .parse()
                .map_err(|value| corrupt("notifications.notification_type", value))?,
            related_job_posting_id: row.related_job_posting_id,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct DeliveryRow {
    id: i64,
    notification_id: i64,
    channel: String,
    destination: String,
    is_success: bool,
    provider_response: String,
    sent_at: DateTime<Utc>,
}

impl TryFrom<DeliveryRow> for NotificationDelivery {
    type Error = Error;

    fn try_from(row: DeliveryRow) -> Result<Self> {
        Ok(NotificationDelivery {
            id: row.id,
            notification_id: row.notification_id,
            channel: row
                .channel
                .parse()
                .map_err(|value| corrupt("notification_deliveries.channel", value))?,
            destination: row.destination,
            is_success: row.is_success,
            provider_response: row.provider_response,
            sent_at: row.sent_at,
        })
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"SELECT id, first_name, last_name, email, phone_number, role, is_active, created_at, updated_at
               FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::try_from).transpose()
    }

    async fn list_active_admins(&self) -> Result<Vec<i64>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"SELECT id FROM users WHERE role = 'Admin' AND is_active ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    async fn list_active_candidates(&self) -> Result<Vec<i64>> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"SELECT id FROM users WHERE role = 'Candidate' AND is_active ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}

#[async_trait]
impl CvRepository for PgStore {
    async fn insert_cv_profile(&self, cv: NewCvProfile) -> Result<CvProfile> {
        let row = sqlx::query_as::<_, CvProfileRow>(
            r#"
            INSERT INTO cv_profiles (
                candidate_id, original_file_name, stored_file_path, mime_type, content_text,
                skills_csv, education_summary, years_of_experience, certifications_summary, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(cv.candidate_id)
        .bind(&cv.original_file_name)
        .bind(&cv.stored_file_path)
        .bind(&cv.mime_type)
        .bind(&cv.content_text)
        .bind(skills_to_csv(&cv.skills))
        .bind(&cv.education_summary)
        .bind(cv.years_of_experience)
        .bind(&cv.certifications_summary)
        .bind(cv.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_cv_profile(&self, id: i64) -> Result<Option<CvProfile>> {
        let row = sqlx::query_as::<_, CvProfileRow>(r#"SELECT * FROM cv_profiles WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn latest_cv_profile(&self, candidate_id: i64) -> Result<Option<CvProfile>> {
        let row = sqlx::query_as::<_, CvProfileRow>(
            r#"SELECT * FROM cv_profiles WHERE candidate_id = $1
               ORDER BY created_at DESC, id DESC LIMIT 1"#,
        )
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list_cv_profiles(&self, candidate_id: i64) -> Result<Vec<CvProfile>> {
        let rows = sqlx::query_as::<_, CvProfileRow>(
            r#"SELECT * FROM cv_profiles WHERE candidate_id = $1 ORDER BY created_at DESC, id DESC"#,
        )
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl JobRepository for PgStore {
    async fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting> {
        let row = sqlx::query_as::<_, JobPostingRow>(
            r#"
            INSERT INTO job_postings (
                company, posted_by_admin_id, title, description, location, employment_type,
                experience_level, required_skills_csv, salary_min, salary_max, is_open,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, TRUE, $11, $11)
            RETURNING *
            "#,
        )
        .bind(&job.company)
        .bind(job.posted_by_admin_id)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.employment_type)
        .bind(&job.experience_level)
        .bind(skills_to_csv(&job.required_skills))
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(job.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_job(&self, id: i64) -> Result<Option<JobPosting>> {
        let row = sqlx::query_as::<_, JobPostingRow>(r#"SELECT * FROM job_postings WHERE id = $1"#)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list_jobs(&self, open_only: bool) -> Result<Vec<JobPosting>> {
        let rows = sqlx::query_as::<_, JobPostingRow>(
            r#"SELECT * FROM job_postings WHERE ($1 = FALSE OR is_open)
               ORDER BY created_at DESC, id DESC"#,
        )
        .bind(open_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_job(&self, job: &JobPosting) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE job_postings
            SET company = $2, title = $3, description = $4, location = $5,
                employment_type = $6, experience_level = $7, required_skills_csv = $8,
                salary_min = $9, salary_max = $10, is_open = $11, updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(job.id)
        .bind(&job.company)
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.location)
        .bind(&job.employment_type)
        .bind(&job.experience_level)
        .bind(skills_to_csv(&job.required_skills))
        .bind(job.salary_min)
        .bind(job.salary_max)
        .bind(job.is_open)
        .bind(job.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_job(&self, id: i64) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM job_postings WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn application_exists(&self, candidate_id: i64, job_posting_id: i64) -> Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"SELECT EXISTS(SELECT 1 FROM job_applications WHERE candidate_id = $1 AND job_posting_id = $2)"#,
        )
        .bind(candidate_id)
        .bind(job_posting_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert_application(&self, application: NewJobApplication) -> Result<JobApplication> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO job_applications (
                job_posting_id, candidate_id, cv_profile_id, cover_letter, strengths_summary,
                weaknesses_summary, match_score, stage, submitted_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(application.job_posting_id)
        .bind(application.candidate_id)
        .bind(application.cv_profile_id)
        .bind(&application.cover_letter)
        .bind(&application.strengths_summary)
        .bind(&application.weaknesses_summary)
        .bind(application.match_score)
        .bind(ApplicationStage::Applied.as_str())
        .bind(application.submitted_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| match err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::AlreadyApplied,
            other => Error::from(other),
        })?;

        let card = &application.scorecard;
        sqlx::query(
            r#"
            INSERT INTO application_scorecards (
                job_application_id, skill_match_score, experience_score, education_score,
                certifications_score, overall_score, strengths_breakdown, gaps_breakdown, generated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(id)
        .bind(card.skill_match_score)
        .bind(card.experience_score)
        .bind(card.education_score)
        .bind(card.certifications_score)
        .bind(card.overall_score)
        .bind(&card.strengths_breakdown)
        .bind(&card.gaps_breakdown)
        .bind(card.generated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(JobApplication {
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
        })
    }

    async fn find_application(&self, id: i64) -> Result<Option<JobApplication>> {
        let sql = format!("{} WHERE a.id = $1", APPLICATION_SELECT);
        let row = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(JobApplication::try_from).transpose()
    }

    async fn list_applications(&self, filter: ApplicationFilter) -> Result<Vec<JobApplication>> {
        let sql = format!(
            "{} WHERE ($1::BIGINT IS NULL OR a.candidate_id = $1)
                AND ($2::BIGINT IS NULL OR a.job_posting_id = $2)
              ORDER BY a.submitted_at DESC, a.id DESC",
            APPLICATION_SELECT
        );
        let rows = sqlx::query_as::<_, ApplicationRow>(&sql)
            .bind(filter.candidate_id)
            .bind(filter.job_posting_id)
            .fetch_all(&self.pool)
            .await?;
        convert_all(rows)
    }

    async fn update_application_stage(
        &self,
        id: i64,
        stage: ApplicationStage,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE job_applications SET stage = $2, updated_at = $3 WHERE id = $1"#,
        )
        .bind(id)
        .bind(stage.as_str())
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_follow_up_note(&self, note: NewFollowUpNote) -> Result<FollowUpNote> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO follow_up_notes (job_application_id, admin_id, note, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(note.job_application_id)
        .bind(note.admin_id)
        .bind(&note.note)
        .bind(note.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(FollowUpNote {
            id,
            job_application_id: note.job_application_id,
            admin_id: note.admin_id,
            note: note.note,
            created_at: note.created_at,
        })
    }

    async fn list_follow_up_notes(&self, application_id: i64) -> Result<Vec<FollowUpNote>> {
        let rows: Vec<(i64, i64, i64, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT id, job_application_id, admin_id, note, created_at
            FROM follow_up_notes
            WHERE job_application_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, job_application_id, admin_id, note, created_at)| FollowUpNote {
                id,
                job_application_id,
                admin_id,
                note,
                created_at,
            })
            .collect())
    }
}

#[async_trait]
impl InterviewRepository for PgStore {
    async fn schedule_interview(&self, interview: NewInterviewSchedule) -> Result<InterviewSchedule> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, InterviewRow>(
            r#"
            INSERT INTO interview_schedules (
                job_application_id, candidate_id, admin_id, interview_type, status,
                scheduled_start, scheduled_end, time_zone, meeting_link_or_location, notes,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(interview.job_application_id)
        .bind(interview.candidate_id)
        .bind(interview.admin_id)
        .bind(&interview.interview_type)
        .bind(InterviewStatus::Scheduled.as_str())
        .bind(interview.scheduled_start)
        .bind(interview.scheduled_end)
        .bind(&interview.time_zone)
        .bind(&interview.meeting_link_or_location)
        .bind(&interview.notes)
        .bind(interview.created_at)
        .fetch_one(&mut *tx)
        .await?;

        let moved = sqlx::query(
            r#"UPDATE job_applications SET stage = $2, updated_at = $3 WHERE id = $1"#,
        )
        .bind(interview.job_application_id)
        .bind(ApplicationStage::InterviewScheduled.as_str())
        .bind(interview.created_at)
        .execute(&mut *tx)
        .await?;

        if moved.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(Error::NotFound("Application not found.".to_string()));
        }

        tx.commit().await?;
        InterviewSchedule::try_from(row)
    }

    async fn find_interview(&self, id: i64) -> Result<Option<InterviewSchedule>> {
        let row = sqlx::query_as::<_, InterviewRow>(
            r#"SELECT * FROM interview_schedules WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(InterviewSchedule::try_from).transpose()
    }

    async fn update_interview_status(
        &self,
        id: i64,
        status: InterviewStatus,
        notes: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE interview_schedules
            SET status = $2, notes = COALESCE($3, notes), updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(notes)
        .bind(at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_interviews(&self, filter: InterviewFilter) -> Result<Vec<InterviewSchedule>> {
        let rows = sqlx::query_as::<_, InterviewRow>(
            r#"
            SELECT * FROM interview_schedules
            WHERE ($1::BIGINT IS NULL OR admin_id = $1)
              AND ($2::BIGINT IS NULL OR candidate_id = $2)
            ORDER BY scheduled_start DESC, id DESC
            "#,
        )
        .bind(filter.admin_id)
        .bind(filter.candidate_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }
}

#[async_trait]
impl AuditRepository for PgStore {
    async fn insert_audit_event(&self, event: NewAuditEvent) -> Result<AuditEvent> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO audit_events (actor_user_id, source, action, category, related_entity_id, details, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(event.actor_user_id)
        .bind(&event.source)
        .bind(&event.action)
        .bind(&event.category)
        .bind(event.related_entity_id)
        .bind(&event.details)
        .bind(event.created_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(AuditEvent {
            id,
            actor_user_id: event.actor_user_id,
            source: event.source,
            action: event.action,
            category: event.category,
            related_entity_id: event.related_entity_id,
            details: event.details,
            created_at: event.created_at,
        })
    }

    async fn list_audit_events(&self, actor_user_id: Option<i64>, limit: i64) -> Result<Vec<AuditEvent>> {
        let rows: Vec<(i64, Option<i64>, String, String, String, Option<i64>, String, DateTime<Utc>)> =
            sqlx::query_as(
                r#"
                SELECT id, actor_user_id, source, action, category, related_entity_id, details, created_at
                FROM audit_events
                WHERE ($1::BIGINT IS NULL OR actor_user_id = $1)
                ORDER BY created_at DESC, id DESC
                LIMIT $2
                "#,
            )
            .bind(actor_user_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, actor_user_id, source, action, category, related_entity_id, details, created_at)| {
                    AuditEvent {
                        id,
                        actor_user_id,
                        source,
                        action,
                        category,
                        related_entity_id,
                        details,
                        created_at,
                    }
                },
            )
            .collect())
    }
}

#[async_trait]
impl NotificationRepository for PgStore {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>(
            r#"
            INSERT INTO notifications (user_id, title, message, notification_type, related_job_posting_id, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING *
            "#,
        )
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.notification_type.as_str())
        .bind(notification.related_job_posting_id)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await?;
        Notification::try_from(row)
    }

    async fn insert_deliveries(
        &self,
        deliveries: Vec<NewNotificationDelivery>,
    ) -> Result<Vec<NotificationDelivery>> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(deliveries.len());

        for delivery in deliveries {
            let row = sqlx::query_as::<_, DeliveryRow>(
                r#"
                INSERT INTO notification_deliveries (notification_id, channel, destination, is_success, provider_response, sent_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(delivery.notification_id)
            .bind(delivery.channel.as_str())
            .bind(&delivery.destination)
            .bind(delivery.is_success)
            .bind(&delivery.provider_response)
            .bind(delivery.sent_at)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(NotificationDelivery::try_from(row)?);
        }

        tx.commit().await?;
        Ok(stored)
    }

    async fn list_notifications(&self, user_id: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn list_deliveries(&self, notification_id: i64) -> Result<Vec<NotificationDelivery>> {
        let rows = sqlx::query_as::<_, DeliveryRow>(
            r#"SELECT * FROM notification_deliveries WHERE notification_id = $1 ORDER BY id"#,
        )
        .bind(notification_id)
        .fetch_all(&self.pool)
        .await?;
        convert_all(rows)
    }

    async fn count_unread(&self, user_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            r#"SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = FALSE"#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count.0)
    }

    async fn mark_notification_read(&self, user_id: i64, notification_id: i64) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2"#,
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_all_read(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE"#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
