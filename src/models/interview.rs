use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterviewStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl InterviewStatus {
    pub const ALL: [InterviewStatus; 4] = [
        InterviewStatus::Scheduled,
        InterviewStatus::Completed,
        InterviewStatus::Cancelled,
        InterviewStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Scheduled => "Scheduled",
            InterviewStatus::Completed => "Completed",
            InterviewStatus::Cancelled => "Cancelled",
            InterviewStatus::NoShow => "NoShow",
        }
    }
}

impl fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSchedule {
    pub id: i64,
    pub job_application_id: i64,
    pub candidate_id: i64,
    pub admin_id: i64,
    pub interview_type: String,
    pub status: InterviewStatus,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub time_zone: String,
    pub meeting_link_or_location: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterviewSchedule {
    pub job_application_id: i64,
    pub candidate_id: i64,
    pub admin_id: i64,
    pub interview_type: String,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub time_zone: String,
    pub meeting_link_or_location: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InterviewFilter {
    pub admin_id: Option<i64>,
    pub candidate_id: Option<i64>,
}

impl InterviewFilter {
    pub fn matches(&self, interview: &InterviewSchedule) -> bool {
        self.admin_id.map_or(true, |id| interview.admin_id == id)
            && self.candidate_id.map_or(true, |id| interview.candidate_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_name() {
        for status in InterviewStatus::ALL {
            assert_eq!(status.as_str().parse::<InterviewStatus>(), Ok(status));
        }
        assert_eq!("noshow".parse::<InterviewStatus>(), Ok(InterviewStatus::NoShow));
        assert!("postponed".parse::<InterviewStatus>().is_err());
    }
}
