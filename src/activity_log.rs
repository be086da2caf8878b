use crate::db::{Database, LOGS_KEY};
use crate::errors::AppResult;
use crate::models::ActivityLogEntry;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

pub const MAX_LOG_ENTRIES: usize = 100;
pub const SYSTEM_ACTOR: &str = "System";

/// Audit trail persisted under the `logs` key, newest entry first.
#[derive(Clone)]
pub struct ActivityLog {
    db: Arc<Database>,
}

impl ActivityLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn add(&self, actor: Option<&str>, action: &str, category: &str) -> AppResult<ActivityLogEntry> {
        let mut logs: Vec<ActivityLogEntry> = self.db.get_collection(LOGS_KEY)?;
        let entry = ActivityLogEntry {
            id: format!("log-{}", Uuid::new_v4()),
            user: actor.unwrap_or(SYSTEM_ACTOR).to_string(),
            action: action.to_string(),
            category: category.to_string(),
            time: Utc::now(),
        };
        push_bounded(&mut logs, entry.clone());
        self.db.set_collection(LOGS_KEY, &logs)?;

        tracing::info!(category, action, user = %entry.user, "activity recorded");
        Ok(entry)
    }

    pub fn get(&self, limit: usize) -> AppResult<Vec<ActivityLogEntry>> {
        let mut logs: Vec<ActivityLogEntry> = self.db.get_collection(LOGS_KEY)?;
        logs.truncate(limit);
        Ok(logs)
    }
}

fn push_bounded(logs: &mut Vec<ActivityLogEntry>, entry: ActivityLogEntry) {
    logs.insert(0, entry);
    logs.truncate(MAX_LOG_ENTRIES);
}
