use crate::models::{CampaignStatus, LeadStatus, Snapshot};
use crate::reports::group_thousands;

const FALLBACK_REPLY: &str =
    "I'm not sure I understand. Could you rephrase that? I can help with campaigns, budget, or leads.";

/// Canned assistant reply. Keywords are checked in a fixed order against the
/// lower-cased message, so "hi" also matches inside longer words.
pub fn reply(message: &str, snapshot: &Snapshot) -> String {
    let message = message.to_lowercase();
    let mentions = |needles: &[&str]| needles.iter().any(|needle| message.contains(needle));

    if mentions(&["hello", "hi"]) {
        "Hello! How can I assist you with your marketing today?".to_string()
    } else if mentions(&["campaign"]) {
        let active = snapshot
            .campaigns
            .iter()
            .filter(|campaign| campaign.status == CampaignStatus::Active)
            .count();
        match best_campaign(snapshot) {
            Some((name, conversions)) => format!(
                "You currently have {} active campaigns. The '{}' is performing best with {} conversions.",
                active, name, conversions
            ),
            None => format!("You currently have {} active campaigns.", active),
        }
    } else if mentions(&["budget", "spend"]) {
        let total: f64 = snapshot.campaigns.iter().map(|campaign| campaign.spent).sum();
        format!(
            "Your total spend across all campaigns is ${}. You are within your allocated budget for this quarter.",
            group_thousands(total)
        )
    } else if mentions(&["lead", "crm"]) {
        let fresh = snapshot
            .leads
            .iter()
            .filter(|lead| lead.status == LeadStatus::New)
            .count();
        format!("You have {} new leads waiting for follow-up in the CRM.", fresh)
    } else if mentions(&["thank"]) {
        "You're welcome! Happy marketing! 🚀".to_string()
    } else {
        FALLBACK_REPLY.to_string()
    }
}

fn best_campaign(snapshot: &Snapshot) -> Option<(&str, u64)> {
    snapshot
        .campaigns
        .iter()
        .filter(|campaign| campaign.status == CampaignStatus::Active)
        .max_by_key(|campaign| campaign.conversions)
        .map(|campaign| (campaign.name.as_str(), campaign.conversions))
}
