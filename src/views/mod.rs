//! Pure view-model rendering.
//!
//! `render` turns a route plus a full snapshot of persisted state into a
//! serializable tree. Nothing here reads storage or the clock; the caller
//! passes both in, so equal inputs always give byte-identical output.

mod account;
mod campaigns;
mod crm;
pub mod filter;
mod overview;

pub use account::{
    find_plan, AdminScreen, AuthScreen, FormField, PlanCard, PlanOffer, PremiumScreen, SettingsScreen, UserRow,
    ADMIN_LOG_LIMIT, PLAN_CATALOG,
};
pub use campaigns::{CampaignRow, CampaignsScreen};
pub use crm::{CrmScreen, LeadCard, LeadColumn, LeadTransition};
pub use overview::{
    AnalyticsScreen, AutomationScreen, CampaignPerformance, DashboardScreen, FunnelStage, ReportsScreen, SourceCount,
    StatCard, Workflow, DASHBOARD_LOG_LIMIT,
};

use crate::errors::AppResult;
use crate::models::{ActivityLogEntry, Role, Snapshot, User};
use crate::router::{self, Route};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedView {
    pub route: Route,
    pub layout: Option<Layout>,
    pub screen: Screen,
}

impl RenderedView {
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum Screen {
    Login(AuthScreen),
    Signup(AuthScreen),
    Dashboard(DashboardScreen),
    Campaigns(CampaignsScreen),
    Analytics(AnalyticsScreen),
    Crm(CrmScreen),
    Automation(AutomationScreen),
    Admin(AdminScreen),
    Settings(SettingsScreen),
    Reports(ReportsScreen),
    Premium(PremiumScreen),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub brand: String,
    pub navigation: Vec<NavItem>,
    pub user: UserBadge,
    pub header: Header,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavItem {
    pub route: Route,
    pub label: String,
    pub active: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBadge {
    pub name: String,
    pub initial: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub title: String,
    pub date_label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub id: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn new(id: &str, kind: ChartKind, labels: &[&str], values: &[f64]) -> Self {
        Self {
            id: id.to_string(),
            kind,
            labels: labels.iter().map(|label| label.to_string()).collect(),
            values: values.to_vec(),
        }
    }

    pub fn revenue() -> Self {
        Self::new(
            "revenueChart",
            ChartKind::Line,
            &["Jan", "Feb", "Mar", "Apr", "May", "Jun"],
            &[12.0, 19.0, 3.0, 5.0, 2.0, 3.0],
        )
    }

    pub fn channels() -> Self {
        Self::new("channelChart", ChartKind::Bar, &["Meta", "Google", "LinkedIn"], &[45.0, 25.0, 30.0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub id: String,
    pub user: String,
    pub action: String,
    pub category: String,
    pub time: DateTime<Utc>,
    pub relative_time: String,
}

impl LogLine {
    fn from_entry(entry: &ActivityLogEntry, now: DateTime<Utc>) -> Self {
        Self {
            id: entry.id.clone(),
            user: entry.user.clone(),
            action: entry.action.clone(),
            category: entry.category.clone(),
            time: entry.time,
            relative_time: time_ago(entry.time, now),
        }
    }
}

/// Renders `route` for `user`. The navigation guard is applied here as well,
/// so a signed-out caller can never receive an authenticated screen.
pub fn render(route: Route, snapshot: &Snapshot, user: Option<&User>, now: DateTime<Utc>) -> RenderedView {
    let route = router::resolve(route, user.is_some());
    let user = match (route, user) {
        (Route::Login, _) => return public_view(Route::Login, Screen::Login(AuthScreen::login())),
        (Route::Signup, _) => return public_view(Route::Signup, Screen::Signup(AuthScreen::signup())),
        (_, Some(user)) => user,
        (_, None) => return public_view(Route::Login, Screen::Login(AuthScreen::login())),
    };

    let screen = match route {
        Route::Campaigns => Screen::Campaigns(CampaignsScreen::build(&snapshot.campaigns)),
        Route::Analytics => Screen::Analytics(AnalyticsScreen::build()),
        Route::Crm => Screen::Crm(CrmScreen::build(&snapshot.leads)),
        Route::Automation => Screen::Automation(AutomationScreen::build()),
        Route::Admin => Screen::Admin(AdminScreen::build(snapshot, now)),
        Route::Settings => Screen::Settings(SettingsScreen::build(user)),
        Route::Reports => Screen::Reports(ReportsScreen::build(snapshot)),
        Route::Premium => Screen::Premium(PremiumScreen::build(user)),
        Route::Dashboard | Route::Login | Route::Signup => Screen::Dashboard(DashboardScreen::build(snapshot, now)),
    };

    RenderedView {
        route,
        layout: Some(layout(route, user, now)),
        screen,
    }
}

fn public_view(route: Route, screen: Screen) -> RenderedView {
    RenderedView {
        route,
        layout: None,
        screen,
    }
}

fn layout(route: Route, user: &User, now: DateTime<Utc>) -> Layout {
    let navigation = Route::NAVIGATION
        .iter()
        .copied()
        .filter(|item| *item != Route::Admin || user.role == Role::Admin)
        .map(|item| NavItem {
            route: item,
            label: item.label().to_string(),
            active: item == route,
            highlighted: item == Route::Premium,
        })
        .collect();

    Layout {
        brand: "NexGen OS".to_string(),
        navigation,
        user: UserBadge {
            name: user.name.clone(),
            initial: user.name.chars().next().map(|ch| ch.to_string()).unwrap_or_default(),
            role: user.role.as_str().to_uppercase(),
        },
        header: Header {
            title: route.label().to_string(),
            date_label: now.format("%Y-%m-%d").to_string(),
        },
    }
}

/// Coarse relative label: `just now`, minutes, hours, days, then the date.
pub fn time_ago(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - time).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let plural = |count: i64, unit: &str| format!("{} {}{} ago", count, unit, if count > 1 { "s" } else { "" });

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "min");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = hours / 24;
    if days < 7 {
        return plural(days, "day");
    }
    time.format("%Y-%m-%d").to_string()
}
