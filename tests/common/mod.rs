#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use applicant_tracking::models::user::{NewUser, User, UserRole};
use applicant_tracking::repository::MemoryStore;
use applicant_tracking::services::email_service::{DeliveryOutcome, EmailSender};
use applicant_tracking::services::sms_service::SmsSender;
use applicant_tracking::AppState;
use async_trait::async_trait;
use tempfile::TempDir;

/// Captures every hand-off and answers with a fixed outcome, except for a
/// destination singled out with `failing_for`.
pub struct RecordingChannel {
    outcome: DeliveryOutcome,
    rejected: Option<(String, DeliveryOutcome)>,
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingChannel {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            outcome: DeliveryOutcome::sent("Sent"),
            rejected: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(response: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: DeliveryOutcome::failed(response),
            rejected: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing_for(destination: &str, response: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: DeliveryOutcome::sent("Sent"),
            rejected: Some((destination.to_string(), DeliveryOutcome::failed(response))),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn answer(&self, to: &str, text: &str) -> DeliveryOutcome {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), text.to_string()));
        match &self.rejected {
            Some((destination, outcome)) if destination == to => outcome.clone(),
            _ => self.outcome.clone(),
        }
    }

    /// (destination, text) pairs in send order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingChannel {
    async fn send(&self, to: &str, subject: &str, _body: &str) -> DeliveryOutcome {
        self.answer(to, subject)
    }
}

#[async_trait]
impl SmsSender for RecordingChannel {
    async fn send(&self, to: &str, message: &str) -> DeliveryOutcome {
        self.answer(to, message)
    }
}

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub email: Arc<RecordingChannel>,
    pub sms: Arc<RecordingChannel>,
    _cv_dir: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_channels(RecordingChannel::succeeding(), RecordingChannel::succeeding())
    }

    pub fn with_channels(email: Arc<RecordingChannel>, sms: Arc<RecordingChannel>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let cv_dir = tempfile::tempdir().expect("temp dir");
        let state = AppState::new(store.clone(), email.clone(), sms.clone(), cv_dir.path());
        Self {
            store,
            state,
            email,
            sms,
            _cv_dir: cv_dir,
        }
    }

    pub async fn admin(&self, first: &str) -> User {
        self.store
            .seed_user(NewUser {
                first_name: first.to_string(),
                last_name: "Admin".to_string(),
                email: format!("{}@corp.example", first.to_lowercase()),
                phone_number: "+15550100".to_string(),
                role: UserRole::Admin,
                is_active: true,
            })
            .await
    }

    pub async fn candidate(&self, first: &str) -> User {
        self.store
            .seed_user(NewUser {
                first_name: first.to_string(),
                last_name: "Candidate".to_string(),
                email: format!("{}@mail.example", first.to_lowercase()),
                phone_number: "+15550199".to_string(),
                role: UserRole::Candidate,
                is_active: true,
            })
            .await
    }
}
