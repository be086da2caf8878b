mod activity_log;
mod app;
mod chatbot;
mod db;
mod errors;
pub mod models;
mod notifications;
pub mod reports;
pub mod router;
mod session;
pub mod views;

pub use crate::app::{ActionResponse, MarketingCore};
pub use crate::errors::{AppError, AppResult};
pub use crate::notifications::{Notification, NotificationLevel};
pub use crate::reports::{Collection, ReportKind};
pub use crate::router::Route;

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// JSON logs to a daily rolling file under `<app data>/logs`, filtered by
/// `RUST_LOG` (default `info`).
pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "marketing.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

#[cfg(feature = "desktop")]
mod desktop {
    use crate::app::{ActionResponse, MarketingCore};
    use crate::models::{
        ActivityLogEntry, AppSettings, CampaignPayload, ChatReply, ExportResponse, LeadPayload, LeadStatus, Plan, SignupPayload,
    };
    use crate::notifications::Notification;
    use crate::reports::{Collection, ReportKind};
    use crate::router::Route;
    use crate::views::{RenderedView, ADMIN_LOG_LIMIT};
    use std::sync::Arc;
    use tauri::Manager;

    #[derive(Clone)]
    struct AppState {
        core: Arc<MarketingCore>,
    }

    #[tauri::command]
    fn render(state: tauri::State<'_, AppState>) -> Result<RenderedView, String> {
        state.core.render().map_err(to_client_error)
    }

    #[tauri::command]
    fn navigate(state: tauri::State<'_, AppState>, route: String) -> Result<RenderedView, String> {
        state.core.navigate(Route::parse(&route)).map_err(to_client_error)
    }

    #[tauri::command]
    fn login(state: tauri::State<'_, AppState>, email: String, password: String) -> Result<ActionResponse, String> {
        state.core.login(&email, &password).map_err(to_client_error)
    }

    #[tauri::command]
    fn signup(state: tauri::State<'_, AppState>, payload: SignupPayload) -> Result<ActionResponse, String> {
        state.core.signup(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn logout(state: tauri::State<'_, AppState>) -> Result<ActionResponse, String> {
        state.core.logout().map_err(to_client_error)
    }

    #[tauri::command]
    fn create_campaign(
        state: tauri::State<'_, AppState>,
        payload: CampaignPayload,
    ) -> Result<ActionResponse, String> {
        state.core.create_campaign(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn update_campaign(
        state: tauri::State<'_, AppState>,
        id: String,
        payload: CampaignPayload,
    ) -> Result<ActionResponse, String> {
        state.core.update_campaign(&id, payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn toggle_campaign(state: tauri::State<'_, AppState>, id: String) -> Result<ActionResponse, String> {
        state.core.toggle_campaign(&id).map_err(to_client_error)
    }

    /// `confirmed` is the answer the front end already collected.
    #[tauri::command]
    fn delete_campaign(
        state: tauri::State<'_, AppState>,
        id: String,
        confirmed: bool,
    ) -> Result<ActionResponse, String> {
        state
            .core
            .delete_campaign(&id, |_| confirmed)
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn create_lead(state: tauri::State<'_, AppState>, payload: LeadPayload) -> Result<ActionResponse, String> {
        state.core.create_lead(payload).map_err(to_client_error)
    }

    #[tauri::command]
    fn update_lead_status(
        state: tauri::State<'_, AppState>,
        id: String,
        status: LeadStatus,
    ) -> Result<ActionResponse, String> {
        state
            .core
            .update_lead_status(&id, status)
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn delete_lead(state: tauri::State<'_, AppState>, id: String, confirmed: bool) -> Result<ActionResponse, String> {
        state.core.delete_lead(&id, |_| confirmed).map_err(to_client_error)
    }

    #[tauri::command]
    fn upgrade_plan(state: tauri::State<'_, AppState>, plan: Plan, confirmed: bool) -> Result<ActionResponse, String> {
        state.core.upgrade_plan(plan, |_| confirmed).map_err(to_client_error)
    }

    #[tauri::command]
    fn clear_all_data(state: tauri::State<'_, AppState>, confirmed: bool) -> Result<ActionResponse, String> {
        state.core.clear_all_data(|_| confirmed).map_err(to_client_error)
    }

    #[tauri::command]
    fn export_csv(
        state: tauri::State<'_, AppState>,
        records: Vec<serde_json::Value>,
        file_name: String,
    ) -> Result<ExportResponse, String> {
        state
            .core
            .export_csv(&records, &file_name)
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn export_report(state: tauri::State<'_, AppState>, kind: ReportKind) -> Result<ExportResponse, String> {
        state.core.export_report(kind).map_err(to_client_error)
    }

    #[tauri::command]
    fn export_collection(state: tauri::State<'_, AppState>, collection: Collection) -> Result<ExportResponse, String> {
        state.core.export_collection(collection).map_err(to_client_error)
    }

    /// Returns once the export task is scheduled; progress arrives as
    /// `app_notification` events.
    #[tauri::command]
    async fn export_all_reports(state: tauri::State<'_, AppState>) -> Result<(), String> {
        state
            .core
            .export_all_reports()
            .map(|_| ())
            .map_err(to_client_error)
    }

    #[tauri::command]
    async fn chat(state: tauri::State<'_, AppState>, message: String) -> Result<ChatReply, String> {
        state.core.chat(&message).await.map_err(to_client_error)
    }

    #[tauri::command]
    fn ai_insight(state: tauri::State<'_, AppState>) -> Notification {
        state.core.ai_insight()
    }

    #[tauri::command]
    fn recent_activity(state: tauri::State<'_, AppState>, limit: Option<usize>) -> Result<Vec<ActivityLogEntry>, String> {
        state
            .core
            .recent_activity(limit.unwrap_or(ADMIN_LOG_LIMIT))
            .map_err(to_client_error)
    }

    #[tauri::command]
    fn take_notifications(state: tauri::State<'_, AppState>) -> Vec<Notification> {
        state.core.take_notifications()
    }

    #[tauri::command]
    fn get_settings(state: tauri::State<'_, AppState>) -> Result<AppSettings, String> {
        state.core.get_settings().map_err(to_client_error)
    }

    #[tauri::command]
    fn update_settings(
        state: tauri::State<'_, AppState>,
        settings: serde_json::Value,
    ) -> Result<AppSettings, String> {
        state.core.update_settings(settings).map_err(to_client_error)
    }

    pub fn run() {
        let result = tauri::Builder::default()
            .setup(|app| {
                let app_data_dir = app.path().app_data_dir().map_err(|error| error.to_string())?;
                std::fs::create_dir_all(&app_data_dir).map_err(|error| error.to_string())?;
                super::init_tracing(&app_data_dir).map_err(|error| error.to_string())?;

                let core = MarketingCore::new(app_data_dir).map_err(|error| error.to_string())?;
                let handle = app.handle().clone();

                tauri::async_runtime::spawn({
                    let core = core.clone();
                    async move {
                        core.attach_app_handle(handle).await;
                    }
                });

                app.manage(AppState { core });
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                render,
                navigate,
                login,
                signup,
                logout,
                create_campaign,
                update_campaign,
                toggle_campaign,
                delete_campaign,
                create_lead,
                update_lead_status,
                delete_lead,
                upgrade_plan,
                clear_all_data,
                export_csv,
                export_report,
                export_collection,
                export_all_reports,
                chat,
                ai_insight,
                recent_activity,
                take_notifications,
                get_settings,
                update_settings
            ])
            .run(tauri::generate_context!());

        if let Err(error) = result {
            tracing::error!(error = %error, "desktop shell exited with error");
        }
    }

    fn to_client_error(error: impl std::fmt::Display) -> String {
        error.to_string()
    }
}

#[cfg(feature = "desktop")]
pub use desktop::run;
