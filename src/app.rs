use crate::activity_log::ActivityLog;
use crate::chatbot;
use crate::db::{Database, CAMPAIGNS_KEY, LEADS_KEY, USERS_KEY};
use crate::errors::{AppError, AppResult};
use crate::models::{
    ActivityLogEntry, AppSettings, Campaign, CampaignPayload, CampaignStatus, ChatReply, ExportResponse, Lead, LeadPayload, LeadStatus,
    Plan, SignupPayload, Snapshot, User,
};
use crate::notifications::{Notification, NotificationCenter, NotificationLevel};
use crate::reports::{self, csv::to_csv, Collection, ReportKind};
use crate::router::{self, Route};
use crate::session::SessionManager;
use crate::views::{self, RenderedView};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[cfg(feature = "desktop")]
use tauri::{AppHandle, Emitter};

const AI_INSIGHT: &str =
    "AI Insight: Based on recent data, consider increasing budget for top-performing campaigns by 15%.";
const AI_INSIGHT_DURATION_MS: u64 = 5_000;
const EXPORT_ALL_NOTICE_MS: u64 = 2_000;
const CLEAR_DATA_PROMPT: &str = "Are you sure you want to clear all data? This cannot be undone!";

/// What every mutating action hands back: whether it took effect, the
/// notification it raised, and a full render of the resulting state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub notification: Option<Notification>,
    pub view: RenderedView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
}

#[derive(Clone)]
pub struct MarketingCore {
    db: Arc<Database>,
    sessions: SessionManager,
    activity: ActivityLog,
    notifications: NotificationCenter,
    route: Arc<RwLock<Route>>,
    mutation_lock: Arc<Mutex<()>>,
    #[cfg(feature = "desktop")]
    app_handle: Arc<tokio::sync::RwLock<Option<AppHandle>>>,
    app_data_dir: PathBuf,
}

impl MarketingCore {
    pub fn new(app_data_dir: PathBuf) -> AppResult<Arc<Self>> {
        let db_path = app_data_dir.join("state.sqlite");
        let db = Arc::new(Database::new(&db_path)?);

        let this = Arc::new(Self {
            sessions: SessionManager::new(db.clone()),
            activity: ActivityLog::new(db.clone()),
            db,
            notifications: NotificationCenter::new(),
            route: Arc::new(RwLock::new(Route::Login)),
            mutation_lock: Arc::new(Mutex::new(())),
            #[cfg(feature = "desktop")]
            app_handle: Arc::new(tokio::sync::RwLock::new(None)),
            app_data_dir,
        });

        // A persisted session survives restarts and lands on the dashboard.
        if this.sessions.is_authenticated()? {
            this.set_route(Route::Dashboard)?;
        }
        tracing::info!(data_dir = %this.app_data_dir.display(), "marketing core ready");
        Ok(this)
    }

    #[cfg(feature = "desktop")]
    pub async fn attach_app_handle(&self, app_handle: AppHandle) {
        let mut writer = self.app_handle.write().await;
        *writer = Some(app_handle);
    }

    pub fn current_route(&self) -> Route {
        self.route.read().map(|route| *route).unwrap_or(Route::Login)
    }

    pub fn current_user(&self) -> Option<User> {
        self.sessions.current_user()
    }

    pub fn is_authenticated(&self) -> AppResult<bool> {
        self.sessions.is_authenticated()
    }

    pub fn snapshot(&self) -> AppResult<Snapshot> {
        self.db.snapshot()
    }

    pub fn render(&self) -> AppResult<RenderedView> {
        self.render_at(Utc::now())
    }

    /// Full re-render from freshly read state. The guarded route becomes the
    /// current route.
    pub fn render_at(&self, now: DateTime<Utc>) -> AppResult<RenderedView> {
        let authenticated = self.sessions.is_authenticated()?;
        let user = if authenticated { self.sessions.current_user() } else { None };
        let route = router::resolve(self.current_route(), user.is_some());
        self.set_route(route)?;

        let snapshot = self.db.snapshot()?;
        Ok(views::render(route, &snapshot, user.as_ref(), now))
    }

    pub fn navigate(&self, route: Route) -> AppResult<RenderedView> {
        tracing::debug!(route = route.as_str(), "navigate");
        self.set_route(route)?;
        self.render()
    }

    pub fn login(&self, email: &str, password: &str) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let Some(user) = self.sessions.authenticate(email, password)? else {
            tracing::info!(email, "login rejected");
            let notification = self.notify(NotificationLevel::Error, "Invalid email or password");
            return self.respond(false, Some(notification), None);
        };

        let name = user.name.clone();
        let user_id = user.id.clone();
        self.sessions.begin(user)?;
        let notification = self.notify(NotificationLevel::Success, format!("Welcome back, {}!", name));
        self.record(&format!("{} logged in", name), "auth")?;
        self.set_route(Route::Dashboard)?;
        tracing::info!(user_id = %user_id, "user logged in");
        self.respond(true, Some(notification), Some(user_id))
    }

    pub fn signup(&self, payload: SignupPayload) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let Some(user) = self.sessions.register(payload)? else {
            let notification = self.notify(NotificationLevel::Error, "Email already exists");
            return self.respond(false, Some(notification), None);
        };

        let name = user.name.clone();
        let user_id = user.id.clone();
        self.sessions.begin(user)?;
        let notification = self.notify(
            NotificationLevel::Success,
            format!("Account created successfully! Welcome, {}!", name),
        );
        self.record(&format!("{} signed up", name), "auth")?;
        self.set_route(Route::Dashboard)?;
        tracing::info!(user_id = %user_id, "user signed up");
        self.respond(true, Some(notification), Some(user_id))
    }

    pub fn logout(&self) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        self.sessions.end()?;
        let notification = self.notify(NotificationLevel::Info, "Logged out successfully");
        self.set_route(Route::Login)?;
        tracing::info!("user logged out");
        self.respond(true, Some(notification), None)
    }

    pub fn create_campaign(&self, payload: CampaignPayload) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut campaigns: Vec<Campaign> = self.db.get_collection(CAMPAIGNS_KEY)?;
        let campaign = Campaign {
            id: format!("c-{}", Uuid::new_v4()),
            name: payload.name,
            channel: payload.channel,
            budget: payload.budget,
            spent: 0.0,
            status: CampaignStatus::Active,
            start: non_empty(payload.start).unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
            end: non_empty(payload.end).unwrap_or_default(),
            clicks: 0,
            impressions: 0,
            conversions: 0,
        };
        let id = campaign.id.clone();
        let name = campaign.name.clone();
        campaigns.push(campaign);
        self.db.set_collection(CAMPAIGNS_KEY, &campaigns)?;

        let notification = self.notify(
            NotificationLevel::Success,
            format!("Campaign \"{}\" created successfully!", name),
        );
        self.record(&format!("Created campaign: {}", name), "campaign")?;
        self.respond(true, Some(notification), Some(id))
    }

    pub fn update_campaign(&self, id: &str, payload: CampaignPayload) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut campaigns: Vec<Campaign> = self.db.get_collection(CAMPAIGNS_KEY)?;
        let Some(campaign) = campaigns.iter_mut().find(|campaign| campaign.id == id) else {
            return self.respond(false, None, None);
        };

        campaign.name = payload.name;
        campaign.channel = payload.channel;
        campaign.budget = payload.budget;
        if let Some(start) = non_empty(payload.start) {
            campaign.start = start;
        }
        if let Some(end) = non_empty(payload.end) {
            campaign.end = end;
        }
        let name = campaign.name.clone();
        self.db.set_collection(CAMPAIGNS_KEY, &campaigns)?;

        let notification = self.notify(
            NotificationLevel::Success,
            format!("Campaign \"{}\" updated successfully", name),
        );
        self.record(&format!("Updated campaign: {}", name), "campaign")?;
        self.respond(true, Some(notification), Some(id.to_string()))
    }

    /// Active <-> paused. Stopped campaigns are left alone.
    pub fn toggle_campaign(&self, id: &str) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut campaigns: Vec<Campaign> = self.db.get_collection(CAMPAIGNS_KEY)?;
        let Some(campaign) = campaigns.iter_mut().find(|campaign| campaign.id == id) else {
            return self.respond(false, None, None);
        };
        let Some(next) = campaign.status.toggled() else {
            tracing::debug!(campaign_id = id, "stopped campaign not toggled");
            return self.respond(false, None, None);
        };

        campaign.status = next;
        let message = format!(
            "Campaign \"{}\" {}",
            campaign.name,
            if next == CampaignStatus::Active { "resumed" } else { "paused" }
        );
        self.db.set_collection(CAMPAIGNS_KEY, &campaigns)?;

        let notification = self.notify(NotificationLevel::Info, message.clone());
        self.record(&message, "campaign")?;
        self.respond(true, Some(notification), Some(id.to_string()))
    }

    pub fn delete_campaign(&self, id: &str, confirm: impl FnOnce(&str) -> bool) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut campaigns: Vec<Campaign> = self.db.get_collection(CAMPAIGNS_KEY)?;
        let Some(name) = campaigns
            .iter()
            .find(|campaign| campaign.id == id)
            .map(|campaign| campaign.name.clone())
        else {
            return self.respond(false, None, None);
        };
        if !confirm(&format!("Are you sure you want to delete \"{}\"?", name)) {
            return self.respond(false, None, None);
        }

        campaigns.retain(|campaign| campaign.id != id);
        self.db.set_collection(CAMPAIGNS_KEY, &campaigns)?;

        let notification = self.notify(
            NotificationLevel::Success,
            format!("Campaign \"{}\" deleted successfully", name),
        );
        self.record(&format!("Deleted campaign: {}", name), "campaign")?;
        self.respond(true, Some(notification), Some(id.to_string()))
    }

    pub fn create_lead(&self, payload: LeadPayload) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut leads: Vec<Lead> = self.db.get_collection(LEADS_KEY)?;
        let lead = Lead {
            id: format!("l-{}", Uuid::new_v4()),
            name: payload.name,
            email: payload.email,
            status: LeadStatus::New,
            score: payload.score.unwrap_or(0).clamp(0, 100) as u8,
            source: non_empty(payload.source).unwrap_or_else(|| "Manual".to_string()),
            phone: non_empty(payload.phone),
            company: non_empty(payload.company),
            created_at: Some(Utc::now()),
        };
        let id = lead.id.clone();
        let name = lead.name.clone();
        leads.push(lead);
        self.db.set_collection(LEADS_KEY, &leads)?;

        let notification = self.notify(NotificationLevel::Success, format!("Lead \"{}\" added successfully", name));
        self.record(&format!("Added lead: {}", name), "crm")?;
        self.respond(true, Some(notification), Some(id))
    }

    /// Any status may move to any other; the board only offers adjacent moves.
    pub fn update_lead_status(&self, id: &str, status: LeadStatus) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut leads: Vec<Lead> = self.db.get_collection(LEADS_KEY)?;
        let Some(lead) = leads.iter_mut().find(|lead| lead.id == id) else {
            return self.respond(false, None, None);
        };
        lead.status = status;
        let name = lead.name.clone();
        self.db.set_collection(LEADS_KEY, &leads)?;

        let notification = self.notify(
            NotificationLevel::Success,
            format!("Lead \"{}\" moved to {}", name, status.as_str()),
        );
        self.record(&format!("Lead \"{}\" status changed to {}", name, status.as_str()), "crm")?;
        self.respond(true, Some(notification), Some(id.to_string()))
    }

    pub fn delete_lead(&self, id: &str, confirm: impl FnOnce(&str) -> bool) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let mut leads: Vec<Lead> = self.db.get_collection(LEADS_KEY)?;
        let Some(name) = leads.iter().find(|lead| lead.id == id).map(|lead| lead.name.clone()) else {
            return self.respond(false, None, None);
        };
        if !confirm(&format!("Delete lead \"{}\"?", name)) {
            return self.respond(false, None, None);
        }

        leads.retain(|lead| lead.id != id);
        self.db.set_collection(LEADS_KEY, &leads)?;

        let notification = self.notify(NotificationLevel::Success, format!("Lead \"{}\" deleted", name));
        self.record(&format!("Deleted lead: {}", name), "crm")?;
        self.respond(true, Some(notification), Some(id.to_string()))
    }

    /// Changes the plan label on the signed-in user. There is no billing.
    pub fn upgrade_plan(&self, plan: Plan, confirm: impl FnOnce(&str) -> bool) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        let Some(current) = self.sessions.current_user() else {
            return self.respond(false, None, None);
        };
        if !confirm(&format!("Are you sure you want to upgrade to {} plan?", plan.display_name())) {
            return self.respond(false, None, None);
        }

        let mut users: Vec<User> = self.db.get_collection(USERS_KEY)?;
        let Some(user) = users.iter_mut().find(|user| user.id == current.id) else {
            return self.respond(false, None, None);
        };
        user.plan = Some(plan);
        let updated = user.clone();
        self.db.set_collection(USERS_KEY, &users)?;
        self.sessions.begin(updated)?;

        let notification = self.notify(
            NotificationLevel::Success,
            format!("Successfully upgraded to {} plan!", plan.display_name()),
        );
        self.record(&format!("Upgraded to {} plan", plan.display_name()), "subscription")?;
        tracing::info!(user_id = %current.id, plan = plan.as_str(), "plan changed");
        self.respond(true, Some(notification), Some(current.id))
    }

    /// Wipes every stored record, forgets the session, reseeds the demo data
    /// and lands on the login screen. Settings are kept.
    pub fn clear_all_data(&self, confirm: impl FnOnce(&str) -> bool) -> AppResult<ActionResponse> {
        let _guard = self.lock_mutations()?;
        if !confirm(CLEAR_DATA_PROMPT) {
            return self.respond(false, None, None);
        }

        let removed = self.db.clear_all()?;
        self.sessions.forget()?;
        self.db.seed_defaults()?;
        self.set_route(Route::Login)?;
        tracing::warn!(removed, "all stored data cleared and reseeded");
        self.respond(true, None, None)
    }

    /// Writes `records` as CSV into the export directory. An empty slice
    /// raises a warning and writes nothing.
    pub fn export_csv<T: Serialize>(&self, records: &[T], file_name: &str) -> AppResult<ExportResponse> {
        if records.is_empty() {
            return Ok(self.export_skipped("No data to export"));
        }

        let contents = to_csv(records)?;
        let file_name = if file_name.trim().is_empty() { "export.csv" } else { file_name };
        let export_dir = self.app_data_dir.join(self.db.get_settings()?.export_dir_name);
        let path = reports::write_export(&export_dir, file_name, &contents)?;
        tracing::info!(path = %path.display(), rows = records.len(), "csv exported");

        Ok(ExportResponse {
            path: Some(path.to_string_lossy().to_string()),
            rows: records.len(),
            notification: self.notify(NotificationLevel::Success, "Data exported successfully"),
        })
    }

    pub fn export_report(&self, kind: ReportKind) -> AppResult<ExportResponse> {
        let now = Utc::now();
        let snapshot = self.db.snapshot()?;
        let file_name = kind.file_name(now);
        match kind {
            ReportKind::Campaign if snapshot.campaigns.is_empty() => Ok(self.export_skipped("No campaigns to export")),
            ReportKind::Campaign => self.export_csv(&reports::campaign_report(&snapshot.campaigns), &file_name),
            ReportKind::Leads if snapshot.leads.is_empty() => Ok(self.export_skipped("No leads to export")),
            ReportKind::Leads => self.export_csv(&reports::leads_report(&snapshot.leads), &file_name),
            ReportKind::Summary => self.export_csv(
                &[reports::summary_report(&snapshot.campaigns, &snapshot.leads, now)],
                &file_name,
            ),
        }
    }

    /// Dumps a stored collection unchanged, under its fixed file name.
    pub fn export_collection(&self, collection: Collection) -> AppResult<ExportResponse> {
        let snapshot = self.db.snapshot()?;
        let file_name = collection.file_name();
        match collection {
            Collection::Campaigns => self.export_csv(&snapshot.campaigns, file_name),
            Collection::Leads => self.export_csv(&snapshot.leads, file_name),
            Collection::ActivityLog => self.export_csv(&snapshot.logs, file_name),
        }
    }

    pub fn export_campaign_report(&self) -> AppResult<ExportResponse> {
        self.export_report(ReportKind::Campaign)
    }

    pub fn export_leads_report(&self) -> AppResult<ExportResponse> {
        self.export_report(ReportKind::Leads)
    }

    pub fn export_summary_report(&self) -> AppResult<ExportResponse> {
        self.export_report(ReportKind::Summary)
    }

    /// Runs the three report exports in the background, `export_stagger_ms`
    /// apart. The handle may be dropped; the exports still complete.
    pub fn export_all_reports(self: &Arc<Self>) -> AppResult<JoinHandle<AppResult<Vec<ExportResponse>>>> {
        let stagger = Duration::from_millis(self.db.get_settings()?.export_stagger_ms);
        self.notify_for(NotificationLevel::Info, "Exporting all reports...", EXPORT_ALL_NOTICE_MS);

        let core = self.clone();
        Ok(tokio::spawn(async move {
            let mut exports = Vec::with_capacity(ReportKind::ALL.len());
            for kind in ReportKind::ALL {
                tokio::time::sleep(stagger).await;
                match core.export_report(kind) {
                    Ok(export) => exports.push(export),
                    Err(error) => {
                        tracing::warn!(error = %error, report = ?kind, "report export failed");
                        return Err(error);
                    }
                }
            }
            core.notify(NotificationLevel::Success, "All reports exported successfully!");
            Ok(exports)
        }))
    }

    /// Canned assistant reply over current data, after the configured delay.
    pub async fn chat(&self, message: &str) -> AppResult<ChatReply> {
        let delay = self.db.get_settings()?.chat_delay_ms;
        tokio::time::sleep(Duration::from_millis(delay)).await;
        let snapshot = self.db.snapshot()?;
        Ok(ChatReply {
            message: message.to_string(),
            reply: chatbot::reply(message, &snapshot),
        })
    }

    pub fn ai_insight(&self) -> Notification {
        self.notify_for(NotificationLevel::Info, AI_INSIGHT, AI_INSIGHT_DURATION_MS)
    }

    /// Newest first, at most `limit` entries.
    pub fn recent_activity(&self, limit: usize) -> AppResult<Vec<ActivityLogEntry>> {
        self.activity.get(limit)
    }

    pub fn take_notifications(&self) -> Vec<Notification> {
        self.notifications.drain()
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        self.db.get_settings()
    }

    pub fn update_settings(&self, settings: serde_json::Value) -> AppResult<AppSettings> {
        let updated = self.db.update_settings(settings)?;
        tracing::info!(settings = ?updated, "settings updated");
        Ok(updated)
    }

    fn respond(
        &self,
        success: bool,
        notification: Option<Notification>,
        entity_id: Option<String>,
    ) -> AppResult<ActionResponse> {
        Ok(ActionResponse {
            success,
            notification,
            view: self.render()?,
            entity_id,
        })
    }

    fn export_skipped(&self, message: &str) -> ExportResponse {
        ExportResponse {
            path: None,
            rows: 0,
            notification: self.notify(NotificationLevel::Warning, message),
        }
    }

    fn record(&self, action: &str, category: &str) -> AppResult<()> {
        let actor = self.sessions.current_user().map(|user| user.name);
        self.activity.add(actor.as_deref(), action, category)?;
        Ok(())
    }

    fn notify(&self, level: NotificationLevel, message: impl Into<String>) -> Notification {
        let duration_ms = match self.db.get_settings() {
            Ok(settings) => settings.toast_duration_ms,
            Err(error) => {
                tracing::warn!(error = %error, "falling back to default toast duration");
                AppSettings::default().toast_duration_ms
            }
        };
        self.notify_for(level, message, duration_ms)
    }

    fn notify_for(&self, level: NotificationLevel, message: impl Into<String>, duration_ms: u64) -> Notification {
        let notification = self.notifications.push(level, message, duration_ms);
        #[cfg(feature = "desktop")]
        self.emit_notification(&notification);
        notification
    }

    #[cfg(feature = "desktop")]
    fn emit_notification(&self, notification: &Notification) {
        if let Ok(handle_opt) = self.app_handle.try_read() {
            if let Some(handle) = handle_opt.as_ref() {
                let _ = handle.emit("app_notification", notification.clone());
            }
        }
    }

    fn set_route(&self, route: Route) -> AppResult<()> {
        let mut current = self
            .route
            .write()
            .map_err(|_| AppError::Internal("route lock poisoned".to_string()))?;
        *current = route;
        Ok(())
    }

    fn lock_mutations(&self) -> AppResult<MutexGuard<'_, ()>> {
        self.mutation_lock
            .lock()
            .map_err(|_| AppError::Internal("mutation lock poisoned".to_string()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::MarketingCore;
    use crate::reports::Collection;
    use crate::models::{CampaignPayload, CampaignStatus, LeadPayload, LeadStatus, Plan, SignupPayload};
    use crate::notifications::NotificationLevel;
    use crate::router::Route;
    use crate::views::Screen;
    use std::cell::Cell;
    use std::sync::Arc;

    fn core(dir: &tempfile::TempDir) -> Arc<MarketingCore> {
        MarketingCore::new(dir.path().to_path_buf()).expect("core")
    }

    fn signed_in(dir: &tempfile::TempDir) -> Arc<MarketingCore> {
        let core = core(dir);
        assert!(core.login("admin@nexgen.com", "123").expect("login").success);
        core.take_notifications();
        core
    }

    fn payload(name: &str) -> CampaignPayload {
        CampaignPayload {
            name: name.to_string(),
            channel: "Email".to_string(),
            budget: 1200.0,
            start: None,
            end: None,
        }
    }

    #[test]
    fn login_success_and_failure() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = core(&dir);

        let rejected = core.login("admin@nexgen.com", "wrong").expect("login");
        assert!(!rejected.success);
        assert_eq!(rejected.view.route, Route::Login);
        assert_eq!(
            rejected.notification.map(|n| (n.level, n.message)),
            Some((NotificationLevel::Error, "Invalid email or password".to_string()))
        );
        assert!(!core.is_authenticated().expect("auth"));

        let accepted = core.login("admin@nexgen.com", "123").expect("login");
        assert!(accepted.success);
        assert_eq!(accepted.view.route, Route::Dashboard);
        assert_eq!(
            accepted.notification.map(|n| n.message),
            Some("Welcome back, Admin User!".to_string())
        );
        assert_eq!(core.current_user().map(|user| user.id), Some("u1".to_string()));

        let logs = core.recent_activity(1).expect("activity");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, "Admin User logged in");
        assert_eq!(logs[0].category, "auth");
    }

    #[test]
    fn signup_rejects_taken_email_and_logs_in_new_users() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = core(&dir);

        let duplicate = core
            .signup(SignupPayload {
                name: "Someone".to_string(),
                email: "jane@nexgen.com".to_string(),
                password: "x".to_string(),
                role: None,
            })
            .expect("signup");
        assert!(!duplicate.success);
        assert_eq!(duplicate.notification.map(|n| n.message), Some("Email already exists".to_string()));

        let created = core
            .signup(SignupPayload {
                name: "New Person".to_string(),
                email: "new@nexgen.com".to_string(),
                password: "pw".to_string(),
                role: None,
            })
            .expect("signup");
        assert!(created.success);
        assert_eq!(created.view.route, Route::Dashboard);
        assert!(created.entity_id.as_deref().is_some_and(|id| id.starts_with("u-")));
        assert_eq!(core.snapshot().expect("snapshot").users.len(), 4);
        assert_eq!(core.snapshot().expect("snapshot").logs[0].action, "New Person signed up");
    }

    #[test]
    fn logout_clears_session_and_guards_routes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);

        let response = core.logout().expect("logout");
        assert_eq!(response.view.route, Route::Login);
        assert!(!core.is_authenticated().expect("auth"));
        assert!(core.current_user().is_none());

        let view = core.navigate(Route::Campaigns).expect("navigate");
        assert_eq!(view.route, Route::Login);
        assert!(view.layout.is_none());
    }

    #[test]
    fn campaign_lifecycle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);

        let created = core.create_campaign(payload("Autumn Push")).expect("create");
        let id = created.entity_id.expect("id");
        let campaign = core
            .snapshot()
            .expect("snapshot")
            .campaigns
            .into_iter()
            .find(|campaign| campaign.id == id)
            .expect("campaign");
        assert_eq!(campaign.status, CampaignStatus::Active);
        assert_eq!(campaign.spent, 0.0);
        assert_eq!(campaign.end, "");
        assert_eq!(campaign.start.len(), 10);
        assert_eq!(
            created.notification.map(|n| n.message),
            Some("Campaign \"Autumn Push\" created successfully!".to_string())
        );

        let mut update = payload("Autumn Push v2");
        update.end = Some("2024-12-01".to_string());
        update.start = Some(String::new());
        core.update_campaign(&id, update).expect("update");
        let updated = core
            .snapshot()
            .expect("snapshot")
            .campaigns
            .into_iter()
            .find(|campaign| campaign.id == id)
            .expect("campaign");
        assert_eq!(updated.name, "Autumn Push v2");
        assert_eq!(updated.start, campaign.start);
        assert_eq!(updated.end, "2024-12-01");

        let paused = core.toggle_campaign(&id).expect("toggle");
        assert_eq!(
            paused.notification.map(|n| n.message),
            Some("Campaign \"Autumn Push v2\" paused".to_string())
        );
        core.toggle_campaign(&id).expect("toggle");
        let status = |core: &MarketingCore, id: &str| {
            core.snapshot()
                .expect("snapshot")
                .campaigns
                .into_iter()
                .find(|campaign| campaign.id == id)
                .map(|campaign| campaign.status)
        };
        assert_eq!(status(&core, &id), Some(CampaignStatus::Active));

        let deleted = core.delete_campaign(&id, |_| true).expect("delete");
        assert!(deleted.success);
        assert_eq!(status(&core, &id), None);
        assert_eq!(core.snapshot().expect("snapshot").logs[0].action, "Deleted campaign: Autumn Push v2");
    }

    #[test]
    fn stopped_campaign_does_not_toggle() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        let logs_before = core.snapshot().expect("snapshot").logs.len();

        let response = core.toggle_campaign("c3").expect("toggle");
        assert!(!response.success);
        assert!(response.notification.is_none());
        let snapshot = core.snapshot().expect("snapshot");
        assert_eq!(snapshot.campaigns[2].status, CampaignStatus::Stopped);
        assert_eq!(snapshot.logs.len(), logs_before);
    }

    #[test]
    fn declined_or_missing_deletes_change_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        let before = core.snapshot().expect("snapshot");

        let prompt = std::cell::RefCell::new(String::new());
        let declined = core
            .delete_campaign("c1", |text| {
                *prompt.borrow_mut() = text.to_string();
                false
            })
            .expect("delete");
        assert!(!declined.success);
        assert_eq!(prompt.into_inner(), "Are you sure you want to delete \"Summer Sale 2024\"?");

        let asked = Cell::new(false);
        core.delete_lead("missing", |_| {
            asked.set(true);
            true
        })
        .expect("delete");
        assert!(!asked.get());

        assert_eq!(core.snapshot().expect("snapshot"), before);
        assert!(core.take_notifications().is_empty());
    }

    #[test]
    fn lead_creation_and_moves() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);

        let created = core
            .create_lead(LeadPayload {
                name: "Dana Lee".to_string(),
                email: "dana@example.com".to_string(),
                score: Some(250),
                phone: Some(String::new()),
                ..LeadPayload::default()
            })
            .expect("create");
        let id = created.entity_id.expect("id");
        let lead = core
            .snapshot()
            .expect("snapshot")
            .leads
            .into_iter()
            .find(|lead| lead.id == id)
            .expect("lead");
        assert_eq!(lead.score, 100);
        assert_eq!(lead.source, "Manual");
        assert_eq!(lead.status, LeadStatus::New);
        assert!(lead.phone.is_none());
        assert!(lead.created_at.is_some());

        let moved = core.update_lead_status("l1", LeadStatus::Qualified).expect("move");
        assert_eq!(
            moved.notification.map(|n| n.message),
            Some("Lead \"John Doe\" moved to qualified".to_string())
        );
        let leads = core.snapshot().expect("snapshot").leads;
        assert_eq!(leads[0].status, LeadStatus::Qualified);
        assert_eq!(leads[1].status, LeadStatus::Qualified);
        assert_eq!(leads[2].status, LeadStatus::Converted);
        assert_eq!(
            core.snapshot().expect("snapshot").logs[0].action,
            "Lead \"John Doe\" status changed to qualified"
        );

        core.delete_lead(&id, |_| true).expect("delete");
        assert_eq!(core.snapshot().expect("snapshot").leads.len(), 3);
    }

    #[test]
    fn plan_upgrade_updates_user_and_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);

        let declined = core.upgrade_plan(Plan::Premium, |_| false).expect("upgrade");
        assert!(!declined.success);
        assert_eq!(core.current_user().and_then(|user| user.plan), None);

        let response = core
            .upgrade_plan(Plan::Premium, |prompt| prompt == "Are you sure you want to upgrade to Premium plan?")
            .expect("upgrade");
        assert!(response.success);
        assert_eq!(core.current_user().and_then(|user| user.plan), Some(Plan::Premium));
        assert_eq!(core.snapshot().expect("snapshot").users[0].plan, Some(Plan::Premium));
        assert_eq!(core.snapshot().expect("snapshot").logs[0].category, "subscription");

        let view = core.navigate(Route::Premium).expect("navigate");
        match view.screen {
            Screen::Premium(screen) => assert_eq!(screen.current_plan, Plan::Premium),
            other => panic!("unexpected screen {:?}", other),
        }
    }

    #[test]
    fn clear_all_data_reseeds_and_signs_out() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        core.create_campaign(payload("Temporary")).expect("create");
        core.update_settings(serde_json::json!({ "toastDurationMs": 4000 })).expect("settings");

        let declined = core.clear_all_data(|_| false).expect("clear");
        assert!(!declined.success);
        assert_eq!(core.snapshot().expect("snapshot").campaigns.len(), 4);

        let cleared = core.clear_all_data(|_| true).expect("clear");
        assert!(cleared.success);
        assert_eq!(cleared.view.route, Route::Login);
        assert!(core.current_user().is_none());
        let snapshot = core.snapshot().expect("snapshot");
        assert_eq!(snapshot.campaigns.len(), 3);
        assert_eq!(snapshot.logs.len(), 1);
        assert_eq!(core.get_settings().expect("settings").toast_duration_ms, 4000);
    }

    #[test]
    fn csv_export_writes_into_export_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);

        let empty: Vec<serde_json::Value> = Vec::new();
        let skipped = core.export_csv(&empty, "nothing.csv").expect("export");
        assert!(skipped.path.is_none());
        assert_eq!(skipped.notification.level, NotificationLevel::Warning);
        assert_eq!(skipped.notification.message, "No data to export");

        let rows = vec![serde_json::json!({ "name": "A,B", "score": 5 })];
        let written = core.export_csv(&rows, "../leads.csv").expect("export");
        let path = written.path.expect("path");
        assert!(path.starts_with(&dir.path().join("exports").to_string_lossy().to_string()));
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "name,score\n\"A,B\",5");
        assert_eq!(written.notification.message, "Data exported successfully");
    }

    #[test]
    fn stored_collections_export_under_fixed_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);

        let campaigns = core.export_collection(Collection::Campaigns).expect("export");
        let path = campaigns.path.expect("path");
        assert!(path.ends_with("campaigns.csv"));
        let contents = std::fs::read_to_string(&path).expect("read");
        let mut lines = contents.lines();
        assert!(lines.next().expect("header").starts_with("id,name,channel,budget,spent,status"));
        assert!(lines.next().expect("row").starts_with("c1,Summer Sale 2024,"));
        assert_eq!(campaigns.rows, 3);

        let logs = core.export_collection(Collection::ActivityLog).expect("export");
        assert!(logs.path.expect("path").ends_with("activity-log.csv"));
        assert_eq!(logs.rows, 2);

        for id in ["l1", "l2", "l3"] {
            core.delete_lead(id, |_| true).expect("delete");
        }
        let leads = core.export_collection(Collection::Leads).expect("export");
        assert!(leads.path.is_none());
        assert_eq!(leads.notification.message, "No data to export");
    }

    #[test]
    fn updates_to_unknown_ids_are_silent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        let before = core.snapshot().expect("snapshot");

        let campaign = core.update_campaign("c-missing", payload("Ghost")).expect("update");
        assert!(!campaign.success);
        assert!(campaign.notification.is_none());

        let lead = core.update_lead_status("l-missing", LeadStatus::Converted).expect("move");
        assert!(!lead.success);
        assert!(lead.notification.is_none());

        assert!(core.take_notifications().is_empty());
        let after = core.snapshot().expect("snapshot");
        assert_eq!(after.logs.len(), before.logs.len());
        assert_eq!(after.campaigns.len(), before.campaigns.len());
        assert!(after.campaigns.iter().all(|campaign| campaign.name != "Ghost"));
    }

    #[test]
    fn empty_collections_skip_report_exports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        for id in ["c1", "c2", "c3"] {
            core.delete_campaign(id, |_| true).expect("delete");
        }

        let response = core.export_campaign_report().expect("export");
        assert!(response.path.is_none());
        assert_eq!(response.notification.message, "No campaigns to export");

        let summary = core.export_summary_report().expect("export");
        assert_eq!(summary.rows, 1);
        assert!(summary.path.is_some());
    }

    #[tokio::test]
    async fn export_all_writes_three_reports() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        core.update_settings(serde_json::json!({ "exportStaggerMs": 5 })).expect("settings");

        let handle = core.export_all_reports().expect("spawn");
        let exports = handle.await.expect("join").expect("exports");
        assert_eq!(exports.len(), 3);
        assert!(exports.iter().all(|export| export.path.is_some()));
        let files = std::fs::read_dir(dir.path().join("exports")).expect("read dir").count();
        assert_eq!(files, 3);

        let messages: Vec<String> = core.take_notifications().into_iter().map(|n| n.message).collect();
        assert_eq!(messages.first().map(String::as_str), Some("Exporting all reports..."));
        assert_eq!(messages.last().map(String::as_str), Some("All reports exported successfully!"));
    }

    #[tokio::test]
    async fn chat_replies_from_current_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let core = signed_in(&dir);
        core.update_settings(serde_json::json!({ "chatDelayMs": 0 })).expect("settings");

        let reply = core.chat("how much budget did we spend?").await.expect("chat");
        assert_eq!(
            reply.reply,
            "Your total spend across all campaigns is $11,600. You are within your allocated budget for this quarter."
        );

        let insight = core.ai_insight();
        assert_eq!(insight.duration_ms, 5_000);
    }

    #[test]
    fn persisted_session_restores_dashboard() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let core = core(&dir);
            core.login("jane@nexgen.com", "123").expect("login");
        }
        let reopened = core(&dir);
        assert_eq!(reopened.current_route(), Route::Dashboard);
        assert_eq!(reopened.render().expect("render").route, Route::Dashboard);
        assert_eq!(reopened.current_user().map(|user| user.name), Some("Marketer Jane".to_string()));
    }
}
