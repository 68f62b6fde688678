use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateJobPayload {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub company: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 120))]
    pub location: String,
    #[validate(length(min = 1, max = 80))]
    pub employment_type: String,
    #[validate(length(min = 1, max = 80))]
    pub experience_level: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
}

/// Blank or absent text fields leave the stored value untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateJobPayload {
    #[validate(length(max = 200))]
    pub company: Option<String>,
    #[validate(length(max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[validate(length(max = 120))]
    pub location: Option<String>,
    #[validate(length(max = 80))]
    pub employment_type: Option<String>,
    #[validate(length(max = 80))]
    pub experience_level: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub is_open: Option<bool>,
}
