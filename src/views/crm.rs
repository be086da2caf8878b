use crate::models::{Lead, LeadStatus};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmScreen {
    pub columns: Vec<LeadColumn>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadColumn {
    pub status: LeadStatus,
    pub title: String,
    pub count: usize,
    pub cards: Vec<LeadCard>,
    pub empty_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCard {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub score: u8,
    pub source: String,
    pub transitions: Vec<LeadTransition>,
}

impl LeadCard {
    pub fn search_text(&self) -> String {
        let mut text = format!("{} {} {} pts {}", self.name, self.email, self.score, self.source);
        if let Some(phone) = &self.phone {
            text.push(' ');
            text.push_str(phone);
        }
        text.to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadTransition {
    pub target: LeadStatus,
    pub label: String,
}

impl CrmScreen {
    pub fn build(leads: &[Lead]) -> Self {
        let columns = LeadStatus::ALL
            .iter()
            .map(|status| {
                let cards: Vec<LeadCard> = leads
                    .iter()
                    .filter(|lead| lead.status == *status)
                    .map(|lead| LeadCard {
                        id: lead.id.clone(),
                        name: lead.name.clone(),
                        email: lead.email.clone(),
                        phone: lead.phone.clone().filter(|phone| !phone.is_empty()),
                        score: lead.score,
                        source: lead.source.clone(),
                        transitions: transitions_from(*status),
                    })
                    .collect();
                let title = column_title(*status);
                LeadColumn {
                    status: *status,
                    title: format!("{} ({})", title, cards.len()),
                    count: cards.len(),
                    empty_message: cards
                        .is_empty()
                        .then(|| format!("No {} leads", title.to_lowercase())),
                    cards,
                }
            })
            .collect();

        Self { columns }
    }

    pub fn column(&self, status: LeadStatus) -> Option<&LeadColumn> {
        self.columns.iter().find(|column| column.status == status)
    }
}

fn column_title(status: LeadStatus) -> &'static str {
    match status {
        LeadStatus::New => "New",
        LeadStatus::Qualified => "Qualified",
        LeadStatus::Converted => "Converted",
    }
}

/// Moves offered from each column. The store itself accepts any target.
fn transitions_from(status: LeadStatus) -> Vec<LeadTransition> {
    let transition = |target, label: &str| LeadTransition {
        target,
        label: label.to_string(),
    };
    match status {
        LeadStatus::New => vec![transition(LeadStatus::Qualified, "→ Qualified")],
        LeadStatus::Qualified => vec![
            transition(LeadStatus::New, "← New"),
            transition(LeadStatus::Converted, "Convert →"),
        ],
        LeadStatus::Converted => vec![transition(LeadStatus::Qualified, "← Qualified")],
    }
}
