use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use crate::dto::cv_dto::{CvProfileView, StructuredCvPayload, TextCvPayload};
use crate::error::{Error, Result};
use crate::models::cv_profile::{CvProfile, NewCvProfile};
use crate::models::job_posting::JobPosting;
use crate::repository::{CvRepository, JobRepository};
use crate::services::audit_service::{AuditEntry, AuditService};
use crate::services::guard::absorb;
use crate::services::matching_service::{self, MatchAnalysis};
use crate::services::skill_extraction::{
    extract_skills, infer_certifications, infer_years_of_experience, normalize_skills,
};
use crate::utils::time::now;

const STRUCTURED_MIME_TYPE: &str = "application/json";

#[derive(Clone)]
pub struct CvService {
    cvs: Arc<dyn CvRepository>,
    jobs: Arc<dyn JobRepository>,
    audit: AuditService,
    storage_dir: PathBuf,
}

impl CvService {
    pub fn new(
        cvs: Arc<dyn CvRepository>,
        jobs: Arc<dyn JobRepository>,
        audit: AuditService,
        storage_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cvs,
            jobs,
            audit,
            storage_dir: storage_dir.into(),
        }
    }

    /// Explicit skills win; the text is only mined when none were given.
    pub async fn upload_structured(
        &self,
        user_id: i64,
        payload: StructuredCvPayload,
    ) -> Result<CvProfileView> {
        payload.validate()?;

        let content = payload.full_text.trim().to_string();
        let skills = if payload.skills.iter().any(|s| !s.trim().is_empty()) {
            normalize_skills(&payload.skills)
        } else {
            normalize_skills(extract_skills(&content))
        };

        let stored_file_path = self
            .write_cv_file(&payload.file_name, STRUCTURED_MIME_TYPE, &content)
            .await?;

        let cv = self
            .cvs
            .insert_cv_profile(NewCvProfile {
                candidate_id: user_id,
                original_file_name: payload.file_name,
                stored_file_path,
                mime_type: STRUCTURED_MIME_TYPE.to_string(),
                content_text: content,
                skills,
                education_summary: payload.education_summary.trim().to_string(),
                years_of_experience: payload.years_of_experience,
                certifications_summary: payload.certifications_summary.trim().to_string(),
                created_at: now(),
            })
            .await?;

        info!(cv_id = cv.id, user_id, "structured cv stored");
        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("CV", "UploadStructured", "CvProfile")
                        .actor(user_id)
                        .related(cv.id)
                        .details(format!("Uploaded structured CV '{}'.", cv.original_file_name))
                        .notify_admins(),
                )
                .await,
            "audit",
            cv.id,
        );

        Ok(cv.into())
    }

    /// Everything except the file name comes from the text heuristics.
    pub async fn upload_text(&self, user_id: i64, payload: TextCvPayload) -> Result<CvProfileView> {
        payload.validate()?;

        let text = payload.raw_text.trim().to_string();
        let stored_file_path = self
            .write_cv_file(&payload.file_name, &payload.content_type, &text)
            .await?;

        let cv = self
            .cvs
            .insert_cv_profile(NewCvProfile {
                candidate_id: user_id,
                original_file_name: payload.file_name,
                stored_file_path,
                mime_type: payload.content_type,
                skills: normalize_skills(extract_skills(&text)),
                education_summary: String::new(),
                years_of_experience: infer_years_of_experience(&text),
                certifications_summary: infer_certifications(&text),
                content_text: text,
                created_at: now(),
            })
            .await?;

        info!(cv_id = cv.id, user_id, "text cv stored");
        absorb(
            self.audit
                .record_event(
                    AuditEntry::new("CV", "UploadText", "CvProfile")
                        .actor(user_id)
                        .related(cv.id)
                        .details(format!("Uploaded text CV '{}'.", cv.original_file_name))
                        .notify_admins(),
                )
                .await,
            "audit",
            cv.id,
        );

        Ok(cv.into())
    }

    pub async fn list_mine(&self, user_id: i64) -> Result<Vec<CvProfileView>> {
        let cvs = self.cvs.list_cv_profiles(user_id).await?;
        Ok(cvs.into_iter().map(CvProfileView::from).collect())
    }

    pub async fn analyze_for_job(&self, cv_profile_id: i64, job_posting_id: i64) -> Result<MatchAnalysis> {
        let cv = self
            .cvs
            .find_cv_profile(cv_profile_id)
            .await?
            .ok_or_else(|| Error::NotFound("CV profile not found.".to_string()))?;
        let job = self
            .jobs
            .find_job(job_posting_id)
            .await?
            .ok_or_else(|| Error::NotFound("Job posting not found.".to_string()))?;

        Ok(analyze(&cv, &job))
    }

    async fn write_cv_file(&self, file_name: &str, content_type: &str, content: &str) -> Result<String> {
        fs::create_dir_all(&self.storage_dir).await?;

        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| !e.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| {
                if content_type.to_lowercase().contains("json") {
                    "json".to_string()
                } else {
                    "txt".to_string()
                }
            });

        let path = self
            .storage_dir
            .join(format!("{}.{}", Uuid::new_v4().simple(), extension));

        fs::write(&path, content).await.map_err(|e| {
            error!(path = %path.display(), error = %e, "failed to write cv file");
            Error::Io(e)
        })?;

        Ok(path.to_string_lossy().into_owned())
    }
}

/// Scores a stored CV against a job. Stored skills are preferred; an empty
/// skill list falls back to mining the CV text again.
pub fn analyze(cv: &CvProfile, job: &JobPosting) -> MatchAnalysis {
    let mut cv_skills = normalize_skills(&cv.skills);
    if cv_skills.is_empty() {
        cv_skills = normalize_skills(extract_skills(&cv.content_text));
    }
    matching_service::score(&cv_skills, cv.years_of_experience, &job.required_skills)
}
