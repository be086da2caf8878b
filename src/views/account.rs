use super::LogLine;
use crate::models::{Plan, Role, Snapshot, User};
use crate::router::Route;
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

pub const ADMIN_LOG_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub input_type: String,
    pub placeholder: String,
}

fn field(name: &str, label: &str, input_type: &str, placeholder: &str) -> FormField {
    FormField {
        name: name.to_string(),
        label: label.to_string(),
        input_type: input_type.to_string(),
        placeholder: placeholder.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthScreen {
    pub title: String,
    pub subtitle: String,
    pub fields: Vec<FormField>,
    pub role_options: Vec<Role>,
    pub submit_label: String,
    pub alternate_route: Route,
    pub alternate_label: String,
}

impl AuthScreen {
    pub fn login() -> Self {
        Self {
            title: "Welcome Back".to_string(),
            subtitle: "Enter your credentials to access the dashboard".to_string(),
            fields: vec![
                field("email", "Email Address", "email", "admin@nexgen.com"),
                field("password", "Password", "password", "••••••"),
            ],
            role_options: Vec::new(),
            submit_label: "Sign In".to_string(),
            alternate_route: Route::Signup,
            alternate_label: "Create Account".to_string(),
        }
    }

    pub fn signup() -> Self {
        Self {
            title: "Create Account".to_string(),
            subtitle: "Join NexGen Marketing OS today".to_string(),
            fields: vec![
                field("name", "Full Name", "text", "John Doe"),
                field("email", "Email Address", "email", "john@example.com"),
                field("password", "Password", "password", "••••••"),
            ],
            // Admin accounts are never self-service.
            role_options: vec![Role::Marketer, Role::Client],
            submit_label: "Get Started".to_string(),
            alternate_route: Route::Login,
            alternate_label: "Sign In".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminScreen {
    pub users: Vec<UserRow>,
    pub logs: Vec<LogLine>,
}

impl AdminScreen {
    pub fn build(snapshot: &Snapshot, now: DateTime<Utc>) -> Self {
        Self {
            users: snapshot
                .users
                .iter()
                .map(|user| UserRow {
                    id: user.id.clone(),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    role: user.role,
                    status: "Active".to_string(),
                })
                .collect(),
            logs: snapshot
                .logs
                .iter()
                .take(ADMIN_LOG_LIMIT)
                .map(|entry| LogLine::from_entry(entry, now))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsScreen {
    pub name: String,
    pub email: String,
    pub role: String,
    pub clear_data_prompt: String,
}

impl SettingsScreen {
    pub fn build(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_uppercase(),
            clear_data_prompt: "Are you sure you want to clear all data? This cannot be undone!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOffer {
    pub plan: Plan,
    pub name: &'static str,
    pub price: u32,
    pub period: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub popular: bool,
}

pub static PLAN_CATALOG: Lazy<Vec<PlanOffer>> = Lazy::new(|| {
    vec![
        PlanOffer {
            plan: Plan::Free,
            name: "Free",
            price: 0,
            period: "forever",
            description: "Perfect for getting started",
            features: &[
                "Up to 3 campaigns",
                "Up to 50 leads",
                "Basic analytics",
                "Email support",
                "Standard templates",
                "5 automation workflows",
            ],
            popular: false,
        },
        PlanOffer {
            plan: Plan::Basic,
            name: "Basic",
            price: 29,
            period: "month",
            description: "For small teams and startups",
            features: &[
                "Up to 15 campaigns",
                "Up to 500 leads",
                "Advanced analytics",
                "Priority email support",
                "Custom templates",
                "Unlimited automation workflows",
                "CSV exports",
                "Basic reporting",
            ],
            popular: false,
        },
        PlanOffer {
            plan: Plan::Premium,
            name: "Premium",
            price: 99,
            period: "month",
            description: "For growing businesses",
            features: &[
                "Unlimited campaigns",
                "Unlimited leads",
                "Advanced analytics & insights",
                "24/7 priority support",
                "Custom branding",
                "Unlimited automation workflows",
                "Advanced CSV/Excel exports",
                "Custom reporting & dashboards",
                "API access",
                "Team collaboration (up to 5 users)",
                "A/B testing tools",
                "Advanced AI insights",
            ],
            popular: true,
        },
        PlanOffer {
            plan: Plan::Enterprise,
            name: "Enterprise",
            price: 299,
            period: "month",
            description: "For large organizations",
            features: &[
                "Everything in Premium",
                "Unlimited team members",
                "Dedicated account manager",
                "Custom integrations",
                "On-premise deployment option",
                "SLA guarantee (99.9% uptime)",
                "Advanced security & compliance",
                "Custom training & onboarding",
                "White-label solution",
                "Advanced custom reporting",
                "Dedicated infrastructure",
            ],
            popular: false,
        },
    ]
});

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanCard {
    #[serde(flatten)]
    pub offer: PlanOffer,
    pub current: bool,
    /// `None` for the current plan, which cannot be re-selected.
    pub action_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumScreen {
    pub current_plan: Plan,
    /// Badge text, shown only once the user has left the free tier.
    pub current_plan_badge: Option<String>,
    pub plans: Vec<PlanCard>,
    pub contact_message: String,
}

impl PremiumScreen {
    pub fn build(user: &User) -> Self {
        let current_plan = user.plan.unwrap_or(Plan::Free);
        let plans = PLAN_CATALOG
            .iter()
            .map(|offer| {
                let current = offer.plan == current_plan;
                PlanCard {
                    offer: offer.clone(),
                    current,
                    action_label: (!current).then(|| {
                        if offer.price == 0 { "Get Started" } else { "Upgrade Now" }.to_string()
                    }),
                }
            })
            .collect();

        Self {
            current_plan,
            current_plan_badge: (current_plan != Plan::Free)
                .then(|| format!("Current Plan: {}", current_plan.display_name())),
            plans,
            contact_message: "Contact sales at sales@nexgen.com or call +1 (555) 123-4567".to_string(),
        }
    }
}

pub fn find_plan(plan: Plan) -> Option<&'static PlanOffer> {
    PLAN_CATALOG.iter().find(|offer| offer.plan == plan)
}
