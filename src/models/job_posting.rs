use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: i64,
    pub company: String,
    pub posted_by_admin_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewJobPosting {
    pub company: String,
    pub posted_by_admin_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub employment_type: String,
    pub experience_level: String,
    pub required_skills: Vec<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}
