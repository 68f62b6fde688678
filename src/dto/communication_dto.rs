use serde::{Deserialize, Serialize};
use validator::Validate;

/// Admin e-mail campaign. Recipients are the listed users plus, optionally,
/// every active candidate; inactive users are skipped either way.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct EmailCampaignPayload {
    #[serde(default)]
    pub user_ids: Vec<i64>,
    #[serde(default)]
    pub include_all_candidates: bool,
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub requested_recipients: usize,
    pub successfully_sent: usize,
    pub failed: usize,
}
