use super::{ChartSeries, LogLine};
use crate::models::Snapshot;
use crate::reports::{group_thousands, guarded_ratio_with, roi_percent, ReportKind, Totals};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DASHBOARD_LOG_LIMIT: usize = 5;
const TOP_CAMPAIGN_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatCard {
    pub label: String,
    pub value: String,
    pub trend: Option<String>,
}

impl StatCard {
    fn new(label: &str, value: String, trend: Option<&str>) -> Self {
        Self {
            label: label.to_string(),
            value,
            trend: trend.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardScreen {
    pub stats: Vec<StatCard>,
    pub charts: Vec<ChartSeries>,
    pub recent_activity: Vec<LogLine>,
    pub empty_message: Option<String>,
}

impl DashboardScreen {
    pub fn build(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        let totals = Totals::of(&snapshot.campaigns);
        let recent_activity: Vec<LogLine> = snapshot
            .logs
            .iter()
            .take(DASHBOARD_LOG_LIMIT)
            .map(|entry| LogLine::from_entry(entry, now))
            .collect();

        Self {
            stats: vec![
                StatCard::new(
                    "Total Spend",
                    format!("${}", group_thousands(totals.spent)),
                    Some("↑ 12% vs last month"),
                ),
                StatCard::new("Conversions", totals.conversions.to_string(), Some("↑ 5% vs last month")),
                StatCard::new("ROAS", "3.4x".to_string(), Some("→ Stable")),
                StatCard::new("Active Campaigns", totals.active_campaigns.to_string(), None),
            ],
            charts: vec![ChartSeries::revenue(), ChartSeries::channels()],
            empty_message: recent_activity
                .is_empty()
                .then(|| "No recent activity".to_string()),
            recent_activity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub label: String,
    pub value: String,
    pub width_percent: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsScreen {
    pub funnel: Vec<FunnelStage>,
    pub chart: ChartSeries,
    pub insight: String,
}

impl AnalyticsScreen {
    pub fn build() -> Self {
        let stage = |label: &str, value: &str, width_percent| FunnelStage {
            label: label.to_string(),
            value: value.to_string(),
            width_percent,
        };
        Self {
            funnel: vec![
                stage("Impressions", "150k", 100),
                stage("Clicks", "4.5k", 45),
                stage("Leads", "850", 15),
                stage("Sales", "120", 5),
            ],
            chart: ChartSeries::channels(),
            insight: "Your \"LinkedIn B2B\" campaign has a 40% higher conversion rate than average. \
                      Consider reallocating budget from \"Google Ads\" to maximize ROAS for the remainder of the quarter."
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub name: String,
    pub trigger: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationScreen {
    pub workflows: Vec<Workflow>,
    pub conditions: Vec<String>,
    pub actions: Vec<String>,
}

impl AutomationScreen {
    pub fn build() -> Self {
        let workflow = |name: &str, trigger: &str, active| Workflow {
            name: name.to_string(),
            trigger: format!("Trigger: {}", trigger),
            active,
        };
        Self {
            workflows: vec![
                workflow("Welcome Sequence", "New Signup", true),
                workflow("Cart Abandonment", "Checkout Drop-off", true),
                workflow("Win-back Campaign", "Inactive 30 days", false),
            ],
            conditions: vec!["Lead Score > 80".to_string(), "Visited Pricing Page".to_string()],
            actions: vec![
                "Send Email: Sales Intro".to_string(),
                "Add to CRM List: Hot Leads".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignPerformance {
    pub name: String,
    pub spent: f64,
    pub conversions: u64,
    pub roi_percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCount {
    pub source: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportsScreen {
    pub total_budget: f64,
    pub total_spent: f64,
    pub utilization_percent: String,
    pub total_conversions: u64,
    pub total_leads: usize,
    pub conversion_rate: String,
    pub active_campaigns: usize,
    pub top_campaigns: Vec<CampaignPerformance>,
    pub lead_sources: Vec<SourceCount>,
    pub exports: Vec<ReportKind>,
}

impl ReportsScreen {
    pub fn build(snapshot: &Snapshot) -> Self {
        let totals = Totals::of(&snapshot.campaigns);

        let top_campaigns = snapshot
            .campaigns
            .iter()
            .take(TOP_CAMPAIGN_LIMIT)
            .map(|campaign| CampaignPerformance {
                name: campaign.name.clone(),
                spent: campaign.spent,
                conversions: campaign.conversions,
                roi_percent: roi_percent(campaign, 1),
            })
            .collect();

        // First-seen order, not alphabetical.
        let mut lead_sources: Vec<SourceCount> = Vec::new();
        for lead in &snapshot.leads {
            match lead_sources.iter_mut().find(|entry| entry.source == lead.source) {
                Some(entry) => entry.count += 1,
                None => lead_sources.push(SourceCount {
                    source: lead.source.clone(),
                    count: 1,
                }),
            }
        }

        Self {
            total_budget: totals.budget,
            total_spent: totals.spent,
            utilization_percent: guarded_ratio_with(totals.spent, totals.budget, 100.0, 1),
            total_conversions: totals.conversions,
            total_leads: snapshot.leads.len(),
            conversion_rate: totals.lead_conversion_rate(snapshot.leads.len()),
            active_campaigns: totals.active_campaigns,
            top_campaigns,
            lead_sources,
            exports: ReportKind::ALL.to_vec(),
        }
    }
}
