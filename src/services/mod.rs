pub mod application_service;
pub mod audit_service;
pub mod communication_service;
pub mod cv_service;
pub mod dashboard_service;
pub mod email_service;
pub(crate) mod guard;
pub mod interview_service;
pub mod job_service;
pub mod matching_service;
pub mod notification_service;
pub mod skill_extraction;
pub mod sms_service;
