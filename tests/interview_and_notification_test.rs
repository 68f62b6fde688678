mod common;

use applicant_tracking::dto::application_dto::{ApplyForJobPayload, JobApplicationView, UpdateStagePayload};
use applicant_tracking::dto::interview_dto::{CreateInterviewPayload, UpdateInterviewStatusPayload};
use applicant_tracking::dto::job_dto::CreateJobPayload;
use applicant_tracking::error::Error;
use applicant_tracking::models::application::ApplicationStage;
use applicant_tracking::models::interview::InterviewStatus;
use applicant_tracking::models::notification::{DeliveryChannel, NotificationType};
use applicant_tracking::models::user::User;
use applicant_tracking::repository::{ApplicationRepository, InterviewRepository};
use applicant_tracking::services::audit_service::AuditEntry;
use applicant_tracking::services::notification_service::OutboundMessage;
use chrono::{Duration, TimeZone, Utc};
use common::{Harness, RecordingChannel};

async fn applied(h: &Harness, admin: &User, candidate: &User) -> JobApplicationView {
    let job = h
        .state
        .job_service
        .create(
            admin.id,
            CreateJobPayload {
                company: "Acme".to_string(),
                title: "Platform Engineer".to_string(),
                description: "Keep the lights on.".to_string(),
                location: "Berlin".to_string(),
                employment_type: "Full-time".to_string(),
                experience_level: "Senior".to_string(),
                required_skills: vec!["docker".to_string(), "kubernetes".to_string()],
                salary_min: None,
                salary_max: None,
            },
        )
        .await
        .unwrap();
    h.state
        .application_service
        .apply(
            candidate.id,
            ApplyForJobPayload {
                job_posting_id: job.id,
                cv_profile_id: None,
                cover_letter: String::new(),
            },
        )
        .await
        .unwrap()
}

fn interview_payload(application_id: i64, notes: &str) -> CreateInterviewPayload {
    let start = Utc.with_ymd_and_hms(2026, 11, 2, 10, 0, 0).unwrap();
    CreateInterviewPayload {
        application_id,
        interview_type: String::new(),
        scheduled_start: start,
        scheduled_end: start + Duration::minutes(45),
        time_zone: "Europe/Berlin".to_string(),
        meeting_link_or_location: "https://meet.example/abc".to_string(),
        notes: notes.to_string(),
    }
}

#[tokio::test]
async fn end_before_start_is_rejected_without_writes() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let application = applied(&h, &admin, &candidate).await;

    let mut payload = interview_payload(application.id, "");
    payload.scheduled_end = payload.scheduled_start;

    let err = h
        .state
        .interview_service
        .schedule(admin.id, payload)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidSchedule));
    assert!(h.state.interview_service.for_admin(admin.id).await.unwrap().is_empty());
    let stored = h.store.find_application(application.id).await.unwrap().unwrap();
    assert_eq!(stored.stage, ApplicationStage::Applied);
}

#[tokio::test]
async fn scheduling_forces_stage_even_from_rejected() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let application = applied(&h, &admin, &candidate).await;

    h.state
        .application_service
        .update_stage(
            admin.id,
            UpdateStagePayload {
                application_id: application.id,
                stage: "Rejected".to_string(),
            },
        )
        .await
        .unwrap();

    let view = h
        .state
        .interview_service
        .schedule(admin.id, interview_payload(application.id, "Bring portfolio"))
        .await
        .unwrap();

    assert_eq!(view.interview_type, "Screening");
    assert_eq!(view.time_zone, "Europe/Berlin");
    assert_eq!(view.status, InterviewStatus::Scheduled);
    assert_eq!(view.candidate_name, "Ada Candidate");
    assert_eq!(view.admin_name, "Grace Admin");

    let stored = h.store.find_application(application.id).await.unwrap().unwrap();
    assert_eq!(stored.stage, ApplicationStage::InterviewScheduled);

    let mine = h.state.interview_service.for_candidate(candidate.id).await.unwrap();
    assert_eq!(mine.len(), 1);

    let invite = h
        .state
        .notification_service
        .list(candidate.id)
        .await
        .unwrap()
        .into_iter()
        .find(|n| n.notification_type == NotificationType::InterviewScheduled)
        .expect("candidate invited");
    assert_eq!(invite.title, "Interview scheduled: Platform Engineer");
    let channels: Vec<_> = h
        .state
        .notification_service
        .deliveries(invite.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.channel)
        .collect();
    assert_eq!(channels.len(), 3);
    assert!(channels.contains(&DeliveryChannel::Sms));
}

#[tokio::test]
async fn scheduling_unknown_application_is_not_found() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;

    let err = h
        .state
        .interview_service
        .schedule(admin.id, interview_payload(9_999, ""))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn only_owning_admin_updates_interview_and_blank_notes_are_kept() {
    let h = Harness::new();
    let owner = h.admin("Grace").await;
    let other_admin = h.admin("Linus").await;
    let candidate = h.candidate("Ada").await;
    let application = applied(&h, &owner, &candidate).await;
    let interview = h
        .state
        .interview_service
        .schedule(owner.id, interview_payload(application.id, "Bring portfolio"))
        .await
        .unwrap();

    let foreign = h
        .state
        .interview_service
        .update_status(
            other_admin.id,
            UpdateInterviewStatusPayload {
                interview_id: interview.id,
                status: "Cancelled".to_string(),
                notes: "nope".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!foreign);

    let kept = h
        .state
        .interview_service
        .update_status(
            owner.id,
            UpdateInterviewStatusPayload {
                interview_id: interview.id,
                status: "completed".to_string(),
                notes: "   ".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(kept);
    let stored = h.store.find_interview(interview.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InterviewStatus::Completed);
    assert_eq!(stored.notes, "Bring portfolio");

    h.state
        .interview_service
        .update_status(
            owner.id,
            UpdateInterviewStatusPayload {
                interview_id: interview.id,
                status: "NoShow".to_string(),
                notes: "Did not join".to_string(),
            },
        )
        .await
        .unwrap();
    let stored = h.store.find_interview(interview.id).await.unwrap().unwrap();
    assert_eq!(stored.status, InterviewStatus::NoShow);
    assert_eq!(stored.notes, "Did not join");

    let bad = h
        .state
        .interview_service
        .update_status(
            owner.id,
            UpdateInterviewStatusPayload {
                interview_id: interview.id,
                status: "Postponed".to_string(),
                notes: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(bad, Error::InvalidInterviewStatus(_)));
}

#[tokio::test]
async fn interview_reads_check_role() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;

    let as_candidate = h.state.interview_service.for_admin(candidate.id).await.unwrap_err();
    assert!(as_candidate.is_authorization());
    let as_admin = h.state.interview_service.for_candidate(admin.id).await.unwrap_err();
    assert!(as_admin.is_authorization());
}

#[tokio::test]
async fn failing_email_provider_is_recorded_not_raised() {
    let email = RecordingChannel::failing("relay status 503: unavailable");
    let h = Harness::with_channels(email.clone(), RecordingChannel::succeeding());
    let candidate = h.candidate("Ada").await;

    let outbound = OutboundMessage::new("Hello", "Welcome aboard", NotificationType::System)
        .with_email()
        .with_sms();
    let notification = h
        .state
        .notification_service
        .notify(candidate.id, &outbound)
        .await
        .unwrap()
        .expect("active user is notified");

    let deliveries = h
        .state
        .notification_service
        .deliveries(notification.id)
        .await
        .unwrap();
    assert_eq!(deliveries.len(), 3);

    let email_row = deliveries
        .iter()
        .find(|d| d.channel == DeliveryChannel::Email)
        .unwrap();
    assert!(!email_row.is_success);
    assert_eq!(email_row.provider_response, "relay status 503: unavailable");
    assert_eq!(email_row.destination, "ada@mail.example");

    let in_app = deliveries
        .iter()
        .find(|d| d.channel == DeliveryChannel::InApp)
        .unwrap();
    assert!(in_app.is_success);

    let sms_row = deliveries
        .iter()
        .find(|d| d.channel == DeliveryChannel::Sms)
        .unwrap();
    assert!(sms_row.is_success);
    assert_eq!(email.sent(), vec![("ada@mail.example".to_string(), "Hello".to_string())]);
}

#[tokio::test]
async fn inactive_recipients_get_nothing() {
    let h = Harness::new();
    let candidate = h.candidate("Ada").await;
    h.store.set_user_active(candidate.id, false).await;

    let outbound = OutboundMessage::new("Hello", "Hi", NotificationType::System).with_email();
    let result = h
        .state
        .notification_service
        .notify(candidate.id, &outbound)
        .await
        .unwrap();

    assert!(result.is_none());
    assert!(h.email.sent().is_empty());
    assert!(h.state.notification_service.list(candidate.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn broadcast_reaches_every_active_candidate_despite_failures() {
    let h = Harness::with_channels(
        RecordingChannel::failing("relay url not configured"),
        RecordingChannel::failing("relay url not configured"),
    );
    let ada = h.candidate("Ada").await;
    let bob = h.candidate("Bob").await;
    let gone = h.candidate("Cy").await;
    h.admin("Grace").await;
    h.store.set_user_active(gone.id, false).await;

    let outbound = OutboundMessage::new("Maintenance", "Back soon", NotificationType::System)
        .with_email()
        .with_sms();
    let notified = h
        .state
        .notification_service
        .broadcast_to_candidates(&outbound)
        .await
        .unwrap();

    assert_eq!(notified, 2);
    for user in [&ada, &bob] {
        assert_eq!(h.state.notification_service.unread_count(user.id).await.unwrap(), 1);
    }
    assert_eq!(h.state.notification_service.unread_count(gone.id).await.unwrap(), 0);
    assert_eq!(h.email.sent().len(), 2);
    assert_eq!(h.sms.sent().len(), 2);
}

#[tokio::test]
async fn inbox_reads_are_owner_scoped() {
    let h = Harness::new();
    let ada = h.candidate("Ada").await;
    let bob = h.candidate("Bob").await;

    let outbound = OutboundMessage::new("One", "First", NotificationType::System);
    let first = h
        .state
        .notification_service
        .notify(ada.id, &outbound)
        .await
        .unwrap()
        .unwrap();
    h.state
        .notification_service
        .notify(ada.id, &OutboundMessage::new("Two", "Second", NotificationType::System))
        .await
        .unwrap();

    assert!(!h.state.notification_service.mark_as_read(bob.id, first.id).await.unwrap());
    assert!(h.state.notification_service.mark_as_read(ada.id, first.id).await.unwrap());
    assert_eq!(h.state.notification_service.unread_count(ada.id).await.unwrap(), 1);
    assert_eq!(h.state.notification_service.mark_all_as_read(ada.id).await.unwrap(), 1);
    assert_eq!(h.state.notification_service.unread_count(ada.id).await.unwrap(), 0);
}

#[tokio::test]
async fn audit_fan_out_skips_the_actor() {
    let h = Harness::new();
    let grace = h.admin("Grace").await;
    let linus = h.admin("Linus").await;

    let event = h
        .state
        .audit_service
        .record_event(
            AuditEntry::new("Job", "Close", "JobPosting")
                .actor(grace.id)
                .related(42)
                .details("  Closed job #42.  ")
                .notify_admins(),
        )
        .await
        .unwrap();
    assert_eq!(event.details, "Closed job #42.");

    let grace_inbox = h.state.notification_service.list(grace.id).await.unwrap();
    assert!(grace_inbox.is_empty());

    let linus_inbox = h.state.notification_service.list(linus.id).await.unwrap();
    assert_eq!(linus_inbox.len(), 1);
    assert_eq!(linus_inbox[0].notification_type, NotificationType::System);
    assert_eq!(linus_inbox[0].title, "Job Close");
    assert_eq!(linus_inbox[0].message, "Grace Admin: Closed job #42.");
    let channels: Vec<_> = h
        .state
        .notification_service
        .deliveries(linus_inbox[0].id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.channel)
        .collect();
    assert_eq!(channels, vec![DeliveryChannel::InApp]);
    assert!(h.email.sent().is_empty());
}

#[tokio::test]
async fn audit_reads_are_newest_first_and_scoped() {
    let h = Harness::new();
    let grace = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;

    for action in ["First", "Second", "Third"] {
        h.state
            .audit_service
            .record_event(AuditEntry::new("Test", action, "Misc").actor(grace.id))
            .await
            .unwrap();
    }
    h.state
        .audit_service
        .record_event(AuditEntry::new("Test", "System", "Misc"))
        .await
        .unwrap();
    h.state
        .audit_service
        .record_event(AuditEntry::new("Test", "Mine", "Misc").actor(candidate.id))
        .await
        .unwrap();

    let latest = h.state.audit_service.latest(Some(2)).await.unwrap();
    assert_eq!(latest.len(), 2);
    assert_eq!(latest[0].action, "Mine");
    assert_eq!(latest[1].actor_name, "System");

    let graces = h.state.audit_service.mine(grace.id, Some(0)).await.unwrap();
    assert_eq!(graces.len(), 1);
    assert_eq!(graces[0].action, "Third");

    let all = h.state.audit_service.mine(grace.id, None).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn interview_actor_is_checked_before_payload() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;

    let mut oversized = interview_payload(1, "");
    oversized.interview_type = "x".repeat(81);
    let by_candidate = h
        .state
        .interview_service
        .schedule(candidate.id, oversized.clone())
        .await
        .unwrap_err();
    assert!(by_candidate.is_authorization());

    let by_admin = h
        .state
        .interview_service
        .schedule(admin.id, oversized)
        .await
        .unwrap_err();
    assert!(matches!(by_admin, Error::InvalidPayload(_)));

    let blank_status = || UpdateInterviewStatusPayload {
        interview_id: 1,
        status: String::new(),
        notes: "n".repeat(2001),
    };
    let unknown_actor = h
        .state
        .interview_service
        .update_status(9_999, blank_status())
        .await
        .unwrap_err();
    assert!(unknown_actor.is_authorization());

    let empty_status = h
        .state
        .interview_service
        .update_status(
            admin.id,
            UpdateInterviewStatusPayload {
                interview_id: 1,
                status: String::new(),
                notes: String::new(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(empty_status, Error::InvalidInterviewStatus(ref s) if s.is_empty()));
}
