pub mod application;
pub mod audit_event;
pub mod cv_profile;
pub mod interview;
pub mod job_posting;
pub mod notification;
pub mod user;
