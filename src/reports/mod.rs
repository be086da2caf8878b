pub mod csv;

use crate::errors::{AppError, AppResult};
use crate::models::{Campaign, CampaignStatus, Lead};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Campaign,
    Leads,
    Summary,
}

impl ReportKind {
    pub const ALL: [ReportKind; 3] = [Self::Campaign, Self::Leads, Self::Summary];

    pub fn file_name(self, now: DateTime<Utc>) -> String {
        let prefix = match self {
            Self::Campaign => "campaign-report",
            Self::Leads => "leads-report",
            Self::Summary => "summary-report",
        };
        format!("{}-{}.csv", prefix, now.format("%Y-%m-%d"))
    }
}

/// Raw stored collections the list screens can dump as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Campaigns,
    Leads,
    ActivityLog,
}

impl Collection {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns.csv",
            Self::Leads => "leads.csv",
            Self::ActivityLog => "activity-log.csv",
        }
    }
}

/// `numerator / denominator * scale` with two decimals, or `"0"` when the
/// denominator is zero.
pub fn guarded_ratio(numerator: f64, denominator: f64, scale: f64) -> String {
    guarded_ratio_with(numerator, denominator, scale, 2)
}

pub fn guarded_ratio_with(numerator: f64, denominator: f64, scale: f64, decimals: usize) -> String {
    if denominator == 0.0 {
        "0".to_string()
    } else {
        format!("{:.*}", decimals, numerator / denominator * scale)
    }
}

/// ROI as a percentage of spend: `(budget - spent) / spent`.
pub fn roi_percent(campaign: &Campaign, decimals: usize) -> String {
    guarded_ratio_with(campaign.budget - campaign.spent, campaign.spent, 100.0, decimals)
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignReportRow {
    #[serde(rename = "Campaign Name")]
    pub name: String,
    #[serde(rename = "Channel")]
    pub channel: String,
    #[serde(rename = "Status")]
    pub status: CampaignStatus,
    #[serde(rename = "Budget ($)")]
    pub budget: f64,
    #[serde(rename = "Spent ($)")]
    pub spent: f64,
    #[serde(rename = "Remaining Budget ($)")]
    pub remaining: f64,
    #[serde(rename = "Impressions")]
    pub impressions: u64,
    #[serde(rename = "Clicks")]
    pub clicks: u64,
    #[serde(rename = "CTR (%)")]
    pub ctr: String,
    #[serde(rename = "Conversions")]
    pub conversions: u64,
    #[serde(rename = "Conversion Rate (%)")]
    pub conversion_rate: String,
    #[serde(rename = "Cost Per Click (CPC)")]
    pub cpc: String,
    #[serde(rename = "Cost Per Acquisition (CPA)")]
    pub cpa: String,
    #[serde(rename = "ROI (%)")]
    pub roi: String,
    #[serde(rename = "Start Date")]
    pub start: String,
    #[serde(rename = "End Date")]
    pub end: String,
}

pub fn campaign_report(campaigns: &[Campaign]) -> Vec<CampaignReportRow> {
    campaigns
        .iter()
        .map(|c| CampaignReportRow {
            name: c.name.clone(),
            channel: c.channel.clone(),
            status: c.status,
            budget: c.budget,
            spent: c.spent,
            remaining: c.budget - c.spent,
            impressions: c.impressions,
            clicks: c.clicks,
            ctr: guarded_ratio(c.clicks as f64, c.impressions as f64, 100.0),
            conversions: c.conversions,
            conversion_rate: guarded_ratio(c.conversions as f64, c.clicks as f64, 100.0),
            cpc: guarded_ratio(c.spent, c.clicks as f64, 1.0),
            cpa: guarded_ratio(c.spent, c.conversions as f64, 1.0),
            roi: roi_percent(c, 2),
            start: c.start.clone(),
            end: or_not_available(Some(c.end.as_str())),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadReportRow {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Phone")]
    pub phone: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Status")]
    pub status: crate::models::LeadStatus,
    #[serde(rename = "Lead Score")]
    pub score: u8,
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Created Date")]
    pub created: String,
}

pub fn leads_report(leads: &[Lead]) -> Vec<LeadReportRow> {
    leads
        .iter()
        .map(|l| LeadReportRow {
            name: l.name.clone(),
            email: l.email.clone(),
            phone: or_not_available(l.phone.as_deref()),
            company: or_not_available(l.company.as_deref()),
            status: l.status,
            score: l.score,
            source: l.source.clone(),
            created: l
                .created_at
                .map(|created| created.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryReportRow {
    #[serde(rename = "Report Date")]
    pub report_date: String,
    #[serde(rename = "Total Campaigns")]
    pub total_campaigns: usize,
    #[serde(rename = "Active Campaigns")]
    pub active_campaigns: usize,
    #[serde(rename = "Total Budget ($)")]
    pub total_budget: f64,
    #[serde(rename = "Total Spent ($)")]
    pub total_spent: f64,
    #[serde(rename = "Remaining Budget ($)")]
    pub remaining: f64,
    #[serde(rename = "Budget Utilization (%)")]
    pub utilization: String,
    #[serde(rename = "Total Impressions")]
    pub impressions: u64,
    #[serde(rename = "Total Clicks")]
    pub clicks: u64,
    #[serde(rename = "Overall CTR (%)")]
    pub ctr: String,
    #[serde(rename = "Total Conversions")]
    pub conversions: u64,
    #[serde(rename = "Total Leads")]
    pub leads: usize,
    #[serde(rename = "Conversion Rate (%)")]
    pub conversion_rate: String,
    #[serde(rename = "Average Cost Per Click")]
    pub average_cpc: String,
    #[serde(rename = "Average Cost Per Acquisition")]
    pub average_cpa: String,
}

/// Portfolio totals shared by the summary export and the reports screen.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub budget: f64,
    pub spent: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub active_campaigns: usize,
}

impl Totals {
    pub fn of(campaigns: &[Campaign]) -> Self {
        campaigns.iter().fold(Self::default(), |mut totals, c| {
            totals.budget += c.budget;
            totals.spent += c.spent;
            totals.impressions += c.impressions;
            totals.clicks += c.clicks;
            totals.conversions += c.conversions;
            if c.status == CampaignStatus::Active {
                totals.active_campaigns += 1;
            }
            totals
        })
    }

    /// Conversions per lead, as a percentage.
    pub fn lead_conversion_rate(&self, lead_count: usize) -> String {
        guarded_ratio(self.conversions as f64, lead_count as f64, 100.0)
    }
}

pub fn summary_report(campaigns: &[Campaign], leads: &[Lead], now: DateTime<Utc>) -> SummaryReportRow {
    let totals = Totals::of(campaigns);
    SummaryReportRow {
        report_date: now.format("%Y-%m-%d").to_string(),
        total_campaigns: campaigns.len(),
        active_campaigns: totals.active_campaigns,
        total_budget: totals.budget,
        total_spent: totals.spent,
        remaining: totals.budget - totals.spent,
        utilization: guarded_ratio(totals.spent, totals.budget, 100.0),
        impressions: totals.impressions,
        clicks: totals.clicks,
        ctr: guarded_ratio(totals.clicks as f64, totals.impressions as f64, 100.0),
        conversions: totals.conversions,
        leads: leads.len(),
        conversion_rate: totals.lead_conversion_rate(leads.len()),
        average_cpc: guarded_ratio(totals.spent, totals.clicks as f64, 1.0),
        average_cpa: guarded_ratio(totals.spent, totals.conversions as f64, 1.0),
    }
}

/// `11600.5` -> `11,600.5`
pub fn group_thousands(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let fraction = (rounded.fract().abs() * 100.0).round() as u64;
    let sign = if rounded < 0.0 { "-" } else { "" };
    match fraction {
        0 => format!("{}{}", sign, grouped),
        f if f % 10 == 0 => format!("{}{}.{}", sign, grouped, f / 10),
        f => format!("{}{}.{:02}", sign, grouped, f),
    }
}

fn or_not_available(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => "N/A".to_string(),
    }
}

/// Writes `contents` under `export_dir`, refusing names that would escape it.
pub fn write_export(export_dir: &Path, file_name: &str, contents: &str) -> AppResult<PathBuf> {
    std::fs::create_dir_all(export_dir).map_err(|error| AppError::Io(error.to_string()))?;

    let output_path = export_dir.join(sanitize_file_name(file_name));
    if !output_path.starts_with(export_dir) {
        return Err(AppError::Io("Resolved export path escaped export directory".to_string()));
    }
    std::fs::write(&output_path, contents).map_err(|error| AppError::Io(error.to_string()))?;
    Ok(output_path)
}

fn sanitize_file_name(value: &str) -> String {
    let base = value.rsplit(['/', '\\']).next().unwrap_or(value);
    let (stem, extension) = match base.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => (stem, extension),
        _ => (base, "csv"),
    };

    let clean = |part: &str| -> String {
        part.chars()
            .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '_' })
            .collect::<String>()
            .trim_matches('_')
            .chars()
            .take(120)
            .collect()
    };

    let stem = clean(stem);
    let extension = clean(extension);
    let stem = if stem.is_empty() { "export".to_string() } else { stem };
    let extension = if extension.is_empty() { "csv".to_string() } else { extension };
    format!("{}.{}", stem, extension)
}
