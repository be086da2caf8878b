//! Search and status filters over rendered rows.
//!
//! Filters never touch storage: they hide rows of an already rendered screen
//! and are reset by the next render.

use super::{CampaignRow, LeadCard};
use crate::models::CampaignStatus;

/// Rows whose visible text contains `term` (case-insensitive) and whose
/// status matches `status` when one is selected. A blank term matches all.
pub fn filter_campaign_rows<'a>(
    rows: &'a [CampaignRow],
    term: &str,
    status: Option<CampaignStatus>,
) -> Vec<&'a CampaignRow> {
    let needle = term.trim().to_lowercase();
    rows.iter()
        .filter(|row| needle.is_empty() || row.search_text().contains(&needle))
        .filter(|row| status.map_or(true, |wanted| row.status == wanted))
        .collect()
}

pub fn filter_lead_cards<'a>(cards: &'a [LeadCard], term: &str) -> Vec<&'a LeadCard> {
    let needle = term.trim().to_lowercase();
    cards
        .iter()
        .filter(|card| needle.is_empty() || card.search_text().contains(&needle))
        .collect()
}
