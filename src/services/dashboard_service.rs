use rust_decimal::Decimal;
use std::sync::Arc;

use crate::dto::dashboard_dto::{AdminDashboard, CandidateDashboard, ChartPoint};
use crate::error::Result;
use crate::models::application::{ApplicationFilter, ApplicationStage, JobApplication};
use crate::models::interview::InterviewFilter;
use crate::repository::{
    ApplicationRepository, InterviewRepository, JobRepository, NotificationRepository,
    UserDirectory,
};
use crate::utils::time::{month_label, now, same_month, trailing_months};

const TREND_MONTHS: u32 = 6;

#[derive(Clone)]
pub struct DashboardService {
    users: Arc<dyn UserDirectory>,
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
    interviews: Arc<dyn InterviewRepository>,
    notifications: Arc<dyn NotificationRepository>,
}

impl DashboardService {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
        interviews: Arc<dyn InterviewRepository>,
        notifications: Arc<dyn NotificationRepository>,
    ) -> Self {
        Self {
            users,
            jobs,
            applications,
            interviews,
            notifications,
        }
    }

    pub async fn admin(&self) -> Result<AdminDashboard> {
        let candidates = self.users.list_active_candidates().await?;
        let admins = self.users.list_active_admins().await?;
        let jobs = self.jobs.list_jobs(false).await?;
        let applications = self.applications.list_applications(ApplicationFilter::all()).await?;
        let interviews = self
            .interviews
            .list_interviews(InterviewFilter::default())
            .await?;

        let open_jobs = jobs.iter().filter(|j| j.is_open).count() as i64;
        let months = trailing_months(now(), TREND_MONTHS);

        let job_posts_by_month = months
            .iter()
            .map(|month| {
                let count = jobs.iter().filter(|j| same_month(j.created_at, *month)).count();
                ChartPoint::new(month_label(*month), count as i64)
            })
            .collect();

        let applications_by_month = months
            .iter()
            .map(|month| {
                let count = applications
                    .iter()
                    .filter(|a| same_month(a.submitted_at, *month))
                    .count();
                ChartPoint::new(month_label(*month), count as i64)
            })
            .collect();

        Ok(AdminDashboard {
            total_candidates: candidates.len() as i64,
            total_admins: admins.len() as i64,
            open_job_postings: open_jobs,
            closed_job_postings: jobs.len() as i64 - open_jobs,
            total_applications: applications.len() as i64,
            pending_review_applications: applications
                .iter()
                .filter(|a| a.stage.is_pending_review())
                .count() as i64,
            total_interviews_scheduled: interviews.len() as i64,
            average_match_score: average_match_score(&applications),
            job_posts_by_month,
            applications_by_month,
            applications_by_stage: by_stage(&applications),
        })
    }

    pub async fn candidate(&self, user_id: i64) -> Result<CandidateDashboard> {
        let open_jobs = self.jobs.list_jobs(true).await?;
        let mine = self
            .applications
            .list_applications(ApplicationFilter::for_candidate(user_id))
            .await?;
        let unread = self.notifications.count_unread(user_id).await?;

        Ok(CandidateDashboard {
            open_job_postings: open_jobs.len() as i64,
            my_applications: mine.len() as i64,
            interview_scheduled: mine
                .iter()
                .filter(|a| a.stage == ApplicationStage::InterviewScheduled)
                .count() as i64,
            notifications_unread: unread,
            my_applications_by_stage: by_stage(&mine),
        })
    }
}

fn average_match_score(applications: &[JobApplication]) -> Decimal {
    if applications.is_empty() {
        return Decimal::ZERO;
    }
    let total: Decimal = applications.iter().map(|a| a.match_score).sum();
    (total / Decimal::from(applications.len() as i64)).round_dp(2)
}

/// Stages that have at least one application, in lifecycle order.
fn by_stage(applications: &[JobApplication]) -> Vec<ChartPoint> {
    ApplicationStage::ALL
        .into_iter()
        .filter_map(|stage| {
            let count = applications.iter().filter(|a| a.stage == stage).count();
            (count > 0).then(|| ChartPoint::new(stage.as_str(), count as i64))
        })
        .collect()
}
