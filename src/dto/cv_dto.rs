use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::cv_profile::CvProfile;

fn default_file_name() -> String {
    "cv.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StructuredCvPayload {
    #[serde(default = "default_file_name")]
    #[validate(length(min = 1, max = 250))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub full_text: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub education_summary: String,
    #[serde(default)]
    #[validate(range(min = 0, max = 80))]
    pub years_of_experience: i32,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub certifications_summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TextCvPayload {
    #[validate(length(min = 1, max = 250))]
    pub file_name: String,
    #[validate(length(max = 200))]
    pub content_type: String,
    #[validate(length(min = 1))]
    pub raw_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvProfileView {
    pub id: i64,
    pub original_file_name: String,
    pub skills: Vec<String>,
    pub education_summary: String,
    pub years_of_experience: i32,
    pub certifications_summary: String,
    pub created_at: DateTime<Utc>,
}

impl From<CvProfile> for CvProfileView {
    fn from(cv: CvProfile) -> Self {
        Self {
            id: cv.id,
            original_file_name: cv.original_file_name,
            skills: cv.skills,
            education_summary: cv.education_summary,
            years_of_experience: cv.years_of_experience,
            certifications_summary: cv.certifications_summary,
            created_at: cv.created_at,
        }
    }
}
