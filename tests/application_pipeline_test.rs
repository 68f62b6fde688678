mod common;

use std::collections::HashSet;
use std::str::FromStr;

use applicant_tracking::dto::application_dto::{
    ApplyForJobPayload, CreateFollowUpNotePayload, UpdateStagePayload,
};
use applicant_tracking::dto::cv_dto::StructuredCvPayload;
use applicant_tracking::dto::dashboard_dto::ChartPoint;
use applicant_tracking::dto::job_dto::CreateJobPayload;
use applicant_tracking::error::Error;
use applicant_tracking::models::application::{ApplicationStage, NewJobApplication};
use applicant_tracking::models::job_posting::JobPosting;
use applicant_tracking::models::notification::{DeliveryChannel, NotificationType};
use applicant_tracking::models::user::User;
use applicant_tracking::repository::ApplicationRepository;
use applicant_tracking::services::matching_service::no_cv_scorecard;
use chrono::Utc;
use common::Harness;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn job_payload(title: &str, skills: &[&str]) -> CreateJobPayload {
    CreateJobPayload {
        company: "Acme".to_string(),
        title: title.to_string(),
        description: "Build and run backend services.".to_string(),
        location: "Remote".to_string(),
        employment_type: "Full-time".to_string(),
        experience_level: "Mid".to_string(),
        required_skills: skills.iter().map(|s| s.to_string()).collect(),
        salary_min: None,
        salary_max: None,
    }
}

async fn post_job(h: &Harness, admin: &User, title: &str, skills: &[&str]) -> JobPosting {
    h.state
        .job_service
        .create(admin.id, job_payload(title, skills))
        .await
        .expect("job created")
}

async fn upload_cv(h: &Harness, candidate: &User, skills: &[&str], years: i32) -> i64 {
    h.state
        .cv_service
        .upload_structured(
            candidate.id,
            StructuredCvPayload {
                file_name: "cv.json".to_string(),
                full_text: "Backend developer.".to_string(),
                skills: skills.iter().map(|s| s.to_string()).collect(),
                education_summary: "BSc Computer Science".to_string(),
                years_of_experience: years,
                certifications_summary: String::new(),
            },
        )
        .await
        .expect("cv stored")
        .id
}

fn apply_payload(job_id: i64, cv_id: Option<i64>) -> ApplyForJobPayload {
    ApplyForJobPayload {
        job_posting_id: job_id,
        cv_profile_id: cv_id,
        cover_letter: "  I would love to join.  ".to_string(),
    }
}

async fn channels_for(h: &Harness, user_id: i64, kind: NotificationType) -> Vec<HashSet<DeliveryChannel>> {
    let mut out = Vec::new();
    for n in h.state.notification_service.list(user_id).await.unwrap() {
        if n.notification_type != kind {
            continue;
        }
        let deliveries = h.state.notification_service.deliveries(n.id).await.unwrap();
        out.push(deliveries.into_iter().map(|d| d.channel).collect());
    }
    out
}

#[tokio::test]
async fn apply_scores_persists_and_fans_out() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let second_admin = h.admin("Linus").await;
    let candidate = h.candidate("Ada").await;

    let job = post_job(&h, &admin, "Backend Engineer", &["c#", "sql", "azure"]).await;
    let cv_id = upload_cv(&h, &candidate, &["c#", "sql"], 3).await;

    let view = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, Some(cv_id)))
        .await
        .expect("application accepted");

    assert_eq!(view.match_score, dec("71.17"));
    assert_eq!(view.overall_score, dec("71.17"));
    assert_eq!(view.stage, ApplicationStage::Applied);
    assert_eq!(view.job_title, "Backend Engineer");
    assert_eq!(view.candidate_email, "ada@mail.example");
    assert_eq!(view.cover_letter, "I would love to join.");
    assert_eq!(view.cv_profile_id, Some(cv_id));
    assert!(view.weaknesses_summary.contains("azure"));

    let audit = h.state.audit_service.latest(None).await.unwrap();
    let application_events: Vec<_> = audit
        .iter()
        .filter(|e| e.category == "JobApplication")
        .collect();
    assert_eq!(application_events.len(), 1);
    assert_eq!(application_events[0].related_entity_id, Some(view.id));
    assert_eq!(application_events[0].actor_name, "Ada Candidate");

    let candidate_channels =
        channels_for(&h, candidate.id, NotificationType::ApplicationSubmitted).await;
    assert_eq!(candidate_channels.len(), 1);
    assert_eq!(
        candidate_channels[0],
        HashSet::from([DeliveryChannel::InApp, DeliveryChannel::Email, DeliveryChannel::Sms])
    );

    for admin_id in [admin.id, second_admin.id] {
        let admin_channels =
            channels_for(&h, admin_id, NotificationType::ApplicationSubmitted).await;
        assert_eq!(admin_channels.len(), 1);
        assert_eq!(
            admin_channels[0],
            HashSet::from([DeliveryChannel::InApp, DeliveryChannel::Email])
        );
    }
}

#[tokio::test]
async fn newest_cv_is_used_when_none_is_named() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Data Engineer", &["python", "sql"]).await;

    upload_cv(&h, &candidate, &["java"], 0).await;
    let newest = upload_cv(&h, &candidate, &["python", "sql"], 0).await;

    let view = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap();

    assert_eq!(view.cv_profile_id, Some(newest));
    assert_eq!(view.match_score, Decimal::ONE_HUNDRED);
}

#[tokio::test]
async fn apply_without_any_cv_gets_fixed_assessment() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Designer", &["figma"]).await;

    let view = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap();

    assert_eq!(view.cv_profile_id, None);
    assert_eq!(view.match_score, Decimal::from(20));
    assert_eq!(view.skill_match_score, Decimal::from(20));
    assert_eq!(view.experience_score, Decimal::from(20));
    assert_eq!(view.education_score, Decimal::from(15));
    assert_eq!(view.certifications_score, Decimal::TEN);
}

#[tokio::test]
async fn second_application_to_same_job_is_rejected() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;

    h.state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap();
    let err = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyApplied));
    let stored = h.state.application_service.get_for_job(job.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_applications_leave_one_row() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;

    let first = h.state.application_service.clone();
    let second = h.state.application_service.clone();
    let (a, b) = tokio::join!(
        first.apply(candidate.id, apply_payload(job.id, None)),
        second.apply(candidate.id, apply_payload(job.id, None)),
    );

    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes
        .iter()
        .any(|r| matches!(r, Err(Error::AlreadyApplied))));
    let stored = h.state.application_service.get_for_job(job.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn store_rejects_duplicate_pair_without_service_precheck() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;

    let row = || {
        let at = Utc::now();
        let scorecard = no_cv_scorecard(at);
        NewJobApplication {
            job_posting_id: job.id,
            candidate_id: candidate.id,
            cv_profile_id: None,
            cover_letter: String::new(),
            strengths_summary: scorecard.strengths_breakdown.clone(),
            weaknesses_summary: scorecard.gaps_breakdown.clone(),
            match_score: scorecard.overall_score,
            submitted_at: at,
            scorecard,
        }
    };

    h.store.insert_application(row()).await.unwrap();
    let err = h.store.insert_application(row()).await.unwrap_err();

    assert!(matches!(err, Error::AlreadyApplied));
    let stored = h.state.application_service.get_for_job(job.id).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn actor_is_checked_before_payload() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;

    let oversized = ApplyForJobPayload {
        job_posting_id: job.id,
        cv_profile_id: None,
        cover_letter: "x".repeat(3001),
    };
    let unknown_user = h
        .state
        .application_service
        .apply(9_999, oversized.clone())
        .await
        .unwrap_err();
    assert!(unknown_user.is_authorization());

    let as_candidate = h
        .state
        .application_service
        .apply(candidate.id, oversized)
        .await
        .unwrap_err();
    assert!(matches!(as_candidate, Error::InvalidPayload(_)));

    let blank_stage = || UpdateStagePayload {
        application_id: 1,
        stage: String::new(),
    };
    let by_candidate = h
        .state
        .application_service
        .update_stage(candidate.id, blank_stage())
        .await
        .unwrap_err();
    assert!(by_candidate.is_authorization());

    let by_admin = h
        .state
        .application_service
        .update_stage(admin.id, blank_stage())
        .await
        .unwrap_err();
    assert!(matches!(by_admin, Error::InvalidStage(ref s) if s.is_empty()));

    let long_note = h
        .state
        .application_service
        .add_follow_up_note(
            candidate.id,
            CreateFollowUpNotePayload {
                application_id: 1,
                note: "n".repeat(2001),
            },
        )
        .await
        .unwrap_err();
    assert!(long_note.is_authorization());

    let long_title = h
        .state
        .job_service
        .create(candidate.id, job_payload(&"t".repeat(201), &[]))
        .await
        .unwrap_err();
    assert!(long_title.is_authorization());
}

#[tokio::test]
async fn closed_or_missing_job_is_unavailable() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;

    assert!(h.state.job_service.close(job.id).await.unwrap());

    let closed = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap_err();
    assert!(matches!(closed, Error::JobUnavailable));

    let missing = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(9_999, None))
        .await
        .unwrap_err();
    assert!(matches!(missing, Error::JobUnavailable));

    assert!(h.state.application_service.get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn only_active_candidates_can_apply() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;

    let as_admin = h
        .state
        .application_service
        .apply(admin.id, apply_payload(job.id, None))
        .await
        .unwrap_err();
    assert!(as_admin.is_authorization());

    h.store.set_user_active(candidate.id, false).await;
    let inactive = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap_err();
    assert!(inactive.is_authorization());
}

#[tokio::test]
async fn cv_of_another_candidate_is_not_found() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let ada = h.candidate("Ada").await;
    let bob = h.candidate("Bob").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;
    let bobs_cv = upload_cv(&h, &bob, &["rust"], 5).await;

    let err = h
        .state
        .application_service
        .apply(ada.id, apply_payload(job.id, Some(bobs_cv)))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn unknown_stage_leaves_application_untouched() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;
    let view = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap();

    let err = h
        .state
        .application_service
        .update_stage(
            admin.id,
            UpdateStagePayload {
                application_id: view.id,
                stage: "banana".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidStage(ref s) if s == "banana"));

    let stored = h.store.find_application(view.id).await.unwrap().unwrap();
    assert_eq!(stored.stage, ApplicationStage::Applied);
    assert!(channels_for(&h, candidate.id, NotificationType::ApplicationStatusUpdated)
        .await
        .is_empty());
}

#[tokio::test]
async fn any_stage_can_be_set_directly() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;
    let view = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap();

    for stage in ["hired", "Applied", "  rejected "] {
        let changed = h
            .state
            .application_service
            .update_stage(
                admin.id,
                UpdateStagePayload {
                    application_id: view.id,
                    stage: stage.to_string(),
                },
            )
            .await
            .unwrap();
        assert!(changed);
    }

    let stored = h.store.find_application(view.id).await.unwrap().unwrap();
    assert_eq!(stored.stage, ApplicationStage::Rejected);
    assert_eq!(
        channels_for(&h, candidate.id, NotificationType::ApplicationStatusUpdated)
            .await
            .len(),
        3
    );

    let missing = h
        .state
        .application_service
        .update_stage(
            admin.id,
            UpdateStagePayload {
                application_id: 9_999,
                stage: "Hired".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(!missing);

    let as_candidate = h
        .state
        .application_service
        .update_stage(
            candidate.id,
            UpdateStagePayload {
                application_id: view.id,
                stage: "Hired".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(as_candidate.is_authorization());
}

#[tokio::test]
async fn follow_up_notes_are_listed_with_author() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["rust"]).await;
    let view = h
        .state
        .application_service
        .apply(candidate.id, apply_payload(job.id, None))
        .await
        .unwrap();

    let note = h
        .state
        .application_service
        .add_follow_up_note(
            admin.id,
            CreateFollowUpNotePayload {
                application_id: view.id,
                note: " Call back on Monday ".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(note.note, "Call back on Monday");
    assert_eq!(note.admin_name, "Grace Admin");

    let blank = h
        .state
        .application_service
        .add_follow_up_note(
            admin.id,
            CreateFollowUpNotePayload {
                application_id: view.id,
                note: "   ".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(blank, Error::Validation(_)));

    let mine = h.state.application_service.get_my(candidate.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].follow_up_notes.len(), 1);
    assert_eq!(mine[0].follow_up_notes[0].admin_name, "Grace Admin");
    assert_eq!(
        channels_for(&h, candidate.id, NotificationType::FollowUpNoteAdded)
            .await
            .len(),
        1
    );
}

#[tokio::test]
async fn dashboards_reflect_pipeline_state() {
    let h = Harness::new();
    let admin = h.admin("Grace").await;
    let candidate = h.candidate("Ada").await;
    let other = h.candidate("Bob").await;
    let job = post_job(&h, &admin, "Backend Engineer", &["c#", "sql", "azure"]).await;
    let cv_id = upload_cv(&h, &candidate, &["c#", "sql"], 3).await;

    h.state
        .application_service
        .apply(candidate.id, apply_payload(job.id, Some(cv_id)))
        .await
        .unwrap();
    h.state
        .application_service
        .apply(other.id, apply_payload(job.id, None))
        .await
        .unwrap();

    let admin_view = h.state.dashboard_service.admin().await.unwrap();
    assert_eq!(admin_view.total_candidates, 2);
    assert_eq!(admin_view.total_admins, 1);
    assert_eq!(admin_view.open_job_postings, 1);
    assert_eq!(admin_view.total_applications, 2);
    assert_eq!(admin_view.pending_review_applications, 2);
    // (71.17 + 20) / 2
    assert_eq!(admin_view.average_match_score, dec("45.58"));
    assert_eq!(
        admin_view.applications_by_stage,
        vec![ChartPoint::new("Applied", 2)]
    );
    assert_eq!(admin_view.applications_by_month.len(), 6);
    assert_eq!(admin_view.applications_by_month[5].value, 2);

    let mine = h.state.dashboard_service.candidate(candidate.id).await.unwrap();
    assert_eq!(mine.open_job_postings, 1);
    assert_eq!(mine.my_applications, 1);
    assert_eq!(mine.interview_scheduled, 0);
    assert!(mine.notifications_unread >= 2);
}
