use crate::models::{ActivityLogEntry, Campaign, CampaignStatus, Lead, LeadStatus, Role, User};
use chrono::{DateTime, Utc};

pub fn default_users() -> Vec<User> {
    vec![
        user("u1", "Admin User", "admin@nexgen.com", Role::Admin),
        user("u2", "Marketer Jane", "jane@nexgen.com", Role::Marketer),
        user("u3", "Client Acme", "client@acme.com", Role::Client),
    ]
}

pub fn default_campaigns() -> Vec<Campaign> {
    vec![
        Campaign {
            id: "c1".to_string(),
            name: "Summer Sale 2024".to_string(),
            channel: "Meta Ads".to_string(),
            budget: 5000.0,
            spent: 2100.0,
            status: CampaignStatus::Active,
            start: "2024-06-01".to_string(),
            end: "2024-08-31".to_string(),
            clicks: 1240,
            impressions: 45000,
            conversions: 85,
        },
        Campaign {
            id: "c2".to_string(),
            name: "B2B Lead Gen".to_string(),
            channel: "LinkedIn".to_string(),
            budget: 8000.0,
            spent: 6500.0,
            status: CampaignStatus::Active,
            start: "2024-01-15".to_string(),
            end: "2024-12-31".to_string(),
            clicks: 850,
            impressions: 12000,
            conversions: 120,
        },
        Campaign {
            id: "c3".to_string(),
            name: "Retargeting Q1".to_string(),
            channel: "Google Ads".to_string(),
            budget: 3000.0,
            spent: 3000.0,
            status: CampaignStatus::Stopped,
            start: "2024-01-01".to_string(),
            end: "2024-03-31".to_string(),
            clicks: 2100,
            impressions: 90000,
            conversions: 210,
        },
    ]
}

pub fn default_leads() -> Vec<Lead> {
    vec![
        lead("l1", "John Doe", "john@gmail.com", LeadStatus::New, 45, "Meta Ads"),
        lead("l2", "Sarah Smith", "sarah@corp.com", LeadStatus::Qualified, 85, "LinkedIn"),
        lead("l3", "Mike Johnson", "mike@yahoo.com", LeadStatus::Converted, 100, "Google Ads"),
    ]
}

pub fn default_logs(now: DateTime<Utc>) -> Vec<ActivityLogEntry> {
    vec![ActivityLogEntry {
        id: "log1".to_string(),
        user: "Admin User".to_string(),
        action: "System Initialized".to_string(),
        category: "system".to_string(),
        time: now,
    }]
}

fn user(id: &str, name: &str, email: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        password: "123".to_string(),
        role,
        plan: None,
    }
}

fn lead(id: &str, name: &str, email: &str, status: LeadStatus, score: u8, source: &str) -> Lead {
    Lead {
        id: id.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        status,
        score,
        source: source.to_string(),
        phone: None,
        company: None,
        created_at: None,
    }
}
