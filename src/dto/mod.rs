pub mod application_dto;
pub mod audit_dto;
pub mod communication_dto;
pub mod cv_dto;
pub mod dashboard_dto;
pub mod interview_dto;
pub mod job_dto;
pub mod notification_dto;
