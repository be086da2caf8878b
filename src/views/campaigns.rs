use crate::models::{Campaign, CampaignStatus};
use crate::reports::roi_percent;
use serde::Serialize;

pub const EMPTY_CAMPAIGNS_MESSAGE: &str = "No campaigns found. Create your first campaign to get started!";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignsScreen {
    pub rows: Vec<CampaignRow>,
    pub status_filters: Vec<CampaignStatus>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    pub id: String,
    pub name: String,
    pub channel: String,
    pub status: CampaignStatus,
    pub budget: f64,
    pub spent: f64,
    pub roi_percent: String,
    pub start: String,
    pub end: String,
    /// Pause/resume is only offered for campaigns that can toggle.
    pub can_toggle: bool,
}

impl CampaignRow {
    /// Visible text of the row, used by the search filter.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {} ${} ${} {}% {} {}",
            self.name,
            self.channel,
            self.status.as_str(),
            self.budget,
            self.spent,
            self.roi_percent,
            self.start,
            self.end
        )
        .to_lowercase()
    }
}

impl CampaignsScreen {
    pub fn build(campaigns: &[Campaign]) -> Self {
        let rows: Vec<CampaignRow> = campaigns
            .iter()
            .map(|campaign| CampaignRow {
                id: campaign.id.clone(),
                name: campaign.name.clone(),
                channel: campaign.channel.clone(),
                status: campaign.status,
                budget: campaign.budget,
                spent: campaign.spent,
                roi_percent: roi_percent(campaign, 1),
                start: campaign.start.clone(),
                end: campaign.end.clone(),
                can_toggle: campaign.status.toggled().is_some(),
            })
            .collect();

        Self {
            empty_message: rows.is_empty().then(|| EMPTY_CAMPAIGNS_MESSAGE.to_string()),
            rows,
            status_filters: vec![CampaignStatus::Active, CampaignStatus::Paused, CampaignStatus::Stopped],
        }
    }
}
