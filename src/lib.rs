pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::repository::{PgStore, RecruitmentStore};
use crate::services::{
    application_service::ApplicationService,
    audit_service::AuditService,
    communication_service::CommunicationService,
    cv_service::CvService,
    dashboard_service::DashboardService,
    email_service::{EmailSender, RelayEmailSender},
    interview_service::InterviewService,
    job_service::JobService,
    notification_service::NotificationService,
    sms_service::{RelaySmsSender, SmsSender},
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub notification_service: NotificationService,
    pub audit_service: AuditService,
    pub communication_service: CommunicationService,
    pub cv_service: CvService,
    pub job_service: JobService,
    pub application_service: ApplicationService,
    pub interview_service: InterviewService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    /// Wires every service over one store and one pair of delivery channels.
    pub fn new<S>(
        store: Arc<S>,
        email: Arc<dyn EmailSender>,
        sms: Arc<dyn SmsSender>,
        cv_storage_dir: impl Into<std::path::PathBuf>,
    ) -> Self
    where
        S: RecruitmentStore + 'static,
    {
        let notification_service =
            NotificationService::new(store.clone(), store.clone(), email.clone(), sms);
        let audit_service =
            AuditService::new(store.clone(), store.clone(), notification_service.clone());
        let communication_service = CommunicationService::new(
            store.clone(),
            email,
            audit_service.clone(),
            notification_service.clone(),
        );
        let cv_service = CvService::new(
            store.clone(),
            store.clone(),
            audit_service.clone(),
            cv_storage_dir,
        );
        let job_service = JobService::new(
            store.clone(),
            store.clone(),
            audit_service.clone(),
            notification_service.clone(),
        );
        let application_service = ApplicationService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            audit_service.clone(),
            notification_service.clone(),
        );
        let interview_service = InterviewService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            audit_service.clone(),
            notification_service.clone(),
        );
        let dashboard_service = DashboardService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
        );

        Self {
            notification_service,
            audit_service,
            communication_service,
            cv_service,
            job_service,
            application_service,
            interview_service,
            dashboard_service,
        }
    }

    /// Production wiring: Postgres storage and the HTTP relay senders.
    pub fn from_pool(pool: PgPool, config: &Config) -> Result<Self> {
        let email = RelayEmailSender::new(config.email.clone(), config.delivery_timeout)?;
        let sms = RelaySmsSender::new(config.sms.clone(), config.delivery_timeout)?;
        Ok(Self::new(
            Arc::new(PgStore::new(pool)),
            Arc::new(email),
            Arc::new(sms),
            config.cv_storage_dir.clone(),
        ))
    }
}
