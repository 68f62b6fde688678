use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable CV submission. New uploads create new rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CvProfile {
    pub id: i64,
    pub candidate_id: i64,
    pub original_file_name: String,
    pub stored_file_path: String,
    pub mime_type: String,
    pub content_text: String,
    pub skills: Vec<String>,
    pub education_summary: String,
    pub years_of_experience: i32,
    pub certifications_summary: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCvProfile {
    pub candidate_id: i64,
    pub original_file_name: String,
    pub stored_file_path: String,
    pub mime_type: String,
    pub content_text: String,
    pub skills: Vec<String>,
    pub education_summary: String,
    pub years_of_experience: i32,
    pub certifications_summary: String,
    pub created_at: DateTime<Utc>,
}
