pub(crate) mod seed;

use crate::errors::{AppError, AppResult};
use crate::models::{AppSettings, Snapshot};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

pub const USERS_KEY: &str = "users";
pub const CAMPAIGNS_KEY: &str = "campaigns";
pub const LEADS_KEY: &str = "leads";
pub const LOGS_KEY: &str = "logs";
pub const SESSION_KEY: &str = "session";

/// JSON key-value store over a single SQLite file.
///
/// Every `set` is written straight through; there is no read cache, so a
/// `get` always observes the last committed value.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        let db = Self { conn: Mutex::new(conn) };
        db.seed_defaults()?;
        db.ensure_default_settings()?;

        Ok(db)
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    /// Returns `None` for a missing key and for a stored JSON `null`.
    pub fn get(&self, key: &str) -> AppResult<Option<serde_json::Value>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM kv_store WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => match serde_json::from_str::<serde_json::Value>(&raw)? {
                serde_json::Value::Null => Ok(None),
                value => Ok(Some(value)),
            },
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &serde_json::Value) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO kv_store (key, value_json, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![key, serde_json::to_string(value)?, Utc::now().to_rfc3339()],
        )?;
        tracing::debug!(key, "store value written");
        Ok(())
    }

    /// Wipes every stored key. Settings live in their own table and survive.
    pub fn clear_all(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM kv_store", [])?;
        tracing::warn!(removed, "store cleared");
        Ok(removed)
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        match self.get(key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> AppResult<()> {
        self.set(key, &serde_json::to_value(value)?)
    }

    pub fn get_collection<T: DeserializeOwned>(&self, key: &str) -> AppResult<Vec<T>> {
        Ok(self.get_json::<Vec<T>>(key)?.unwrap_or_default())
    }

    pub fn set_collection<T: Serialize>(&self, key: &str, items: &[T]) -> AppResult<()> {
        self.set_json(key, items)
    }

    pub fn snapshot(&self) -> AppResult<Snapshot> {
        Ok(Snapshot {
            users: self.get_collection(USERS_KEY)?,
            campaigns: self.get_collection(CAMPAIGNS_KEY)?,
            leads: self.get_collection(LEADS_KEY)?,
            logs: self.get_collection(LOGS_KEY)?,
        })
    }

    /// First-run initialization. Returns `true` when demo data was written;
    /// an existing `users` key leaves every collection untouched.
    pub fn seed_defaults(&self) -> AppResult<bool> {
        if self.get(USERS_KEY)?.is_some() {
            return Ok(false);
        }

        let entries = [
            (USERS_KEY, serde_json::to_string(&seed::default_users())?),
            (CAMPAIGNS_KEY, serde_json::to_string(&seed::default_campaigns())?),
            (LEADS_KEY, serde_json::to_string(&seed::default_leads())?),
            (LOGS_KEY, serde_json::to_string(&seed::default_logs(Utc::now()))?),
        ];

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();
        for (key, value_json) in entries.iter() {
            tx.execute(
                "INSERT INTO kv_store (key, value_json, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
                params![key, value_json, now],
            )?;
        }
        tx.commit()?;

        tracing::info!("seeded default demo data");
        Ok(true)
    }

    pub fn get_settings(&self) -> AppResult<AppSettings> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT value_json FROM settings WHERE key = 'app'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match raw {
            Some(raw) => Ok(serde_json::from_str::<AppSettings>(&raw).unwrap_or_default()),
            None => Ok(AppSettings::default()),
        }
    }

    pub fn update_settings(&self, update: serde_json::Value) -> AppResult<AppSettings> {
        let current = self.get_settings()?;
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: AppSettings = serde_json::from_value(merged)
            .map_err(|error| AppError::Validation(format!("invalid settings: {}", error)))?;
        validate_settings(&settings)?;

        self.write_settings(&settings)?;
        Ok(settings)
    }

    fn ensure_default_settings(&self) -> AppResult<()> {
        let exists = {
            let conn = self.lock()?;
            conn.query_row("SELECT COUNT(1) FROM settings WHERE key = 'app'", [], |row| row.get::<_, i64>(0))?
        };
        if exists == 0 {
            self.write_settings(&AppSettings::default())?;
        }
        Ok(())
    }

    fn write_settings(&self, settings: &AppSettings) -> AppResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO settings (key, value_json, updated_at)
             VALUES ('app', ?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json, updated_at = excluded.updated_at",
            params![serde_json::to_string(settings)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn validate_settings(settings: &AppSettings) -> AppResult<()> {
    if settings.toast_duration_ms == 0 {
        return Err(AppError::Validation("toastDurationMs must be positive".to_string()));
    }
    let dir = settings.export_dir_name.trim();
    if dir.is_empty() || dir.contains('/') || dir.contains('\\') || dir.starts_with('.') {
        return Err(AppError::Validation(format!(
            "exportDirName must be a plain directory name, got {:?}",
            settings.export_dir_name
        )));
    }
    Ok(())
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Database, CAMPAIGNS_KEY, LEADS_KEY, LOGS_KEY, SESSION_KEY, USERS_KEY};
    use crate::models::{Campaign, CampaignStatus, Lead, LeadStatus, Role, User};

    fn open(dir: &tempfile::TempDir) -> Database {
        Database::new(&dir.path().join("test.db")).expect("db")
    }

    #[test]
    fn first_open_seeds_demo_data() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        let users: Vec<User> = db.get_collection(USERS_KEY).expect("users");
        let credentials: Vec<(&str, &str, Role)> = users
            .iter()
            .map(|user| (user.email.as_str(), user.password.as_str(), user.role))
            .collect();
        assert_eq!(
            credentials,
            vec![
                ("admin@nexgen.com", "123", Role::Admin),
                ("jane@nexgen.com", "123", Role::Marketer),
                ("client@acme.com", "123", Role::Client),
            ]
        );

        let campaigns: Vec<Campaign> = db.get_collection(CAMPAIGNS_KEY).expect("campaigns");
        let summary: Vec<(&str, f64, f64, CampaignStatus)> = campaigns
            .iter()
            .map(|c| (c.name.as_str(), c.budget, c.spent, c.status))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Summer Sale 2024", 5000.0, 2100.0, CampaignStatus::Active),
                ("B2B Lead Gen", 8000.0, 6500.0, CampaignStatus::Active),
                ("Retargeting Q1", 3000.0, 3000.0, CampaignStatus::Stopped),
            ]
        );

        let leads: Vec<Lead> = db.get_collection(LEADS_KEY).expect("leads");
        let summary: Vec<(&str, LeadStatus, u8)> =
            leads.iter().map(|l| (l.name.as_str(), l.status, l.score)).collect();
        assert_eq!(
            summary,
            vec![
                ("John Doe", LeadStatus::New, 45),
                ("Sarah Smith", LeadStatus::Qualified, 85),
                ("Mike Johnson", LeadStatus::Converted, 100),
            ]
        );

        let snapshot = db.snapshot().expect("snapshot");
        assert_eq!(snapshot.logs.len(), 1);
        assert!(db.get(SESSION_KEY).expect("session").is_none());
    }

    #[test]
    fn reseeding_with_existing_users_changes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        let mut campaigns: Vec<Campaign> = db.get_collection(CAMPAIGNS_KEY).expect("campaigns");
        campaigns.truncate(1);
        db.set_collection(CAMPAIGNS_KEY, &campaigns).expect("write campaigns");
        let before = db.snapshot().expect("snapshot");

        assert!(!db.seed_defaults().expect("seed"));
        drop(db);
        let reopened = open(&dir);
        assert_eq!(reopened.snapshot().expect("snapshot"), before);
    }

    #[test]
    fn stored_values_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        let lead = Lead {
            id: "l-x".to_string(),
            name: "Ana, Inc".to_string(),
            email: "ana@example.com".to_string(),
            status: LeadStatus::Qualified,
            score: 77,
            source: "Website".to_string(),
            phone: Some("+1 555 0100".to_string()),
            company: None,
            created_at: Some(chrono::Utc::now()),
        };
        db.set_json("probe", &vec![lead.clone()]).expect("set");
        let loaded: Vec<Lead> = db.get_json("probe").expect("get").expect("present");
        assert_eq!(loaded, vec![lead]);

        let raw = serde_json::json!({ "nested": [1, 2.5, "x", null, true] });
        db.set("raw", &raw).expect("set raw");
        assert_eq!(db.get("raw").expect("get raw"), Some(raw));
    }

    #[test]
    fn missing_and_null_keys_read_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        assert!(db.get("nope").expect("get").is_none());
        db.set(SESSION_KEY, &serde_json::Value::Null).expect("set null");
        assert!(db.get(SESSION_KEY).expect("get").is_none());
        assert!(db.get_collection::<Lead>("nope").expect("collection").is_empty());
    }

    #[test]
    fn clear_all_wipes_every_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        assert_eq!(db.clear_all().expect("clear"), 4);
        assert!(db.get(USERS_KEY).expect("users").is_none());
        assert!(db.get(LOGS_KEY).expect("logs").is_none());
        assert!(db.seed_defaults().expect("reseed"));
    }

    #[test]
    fn settings_merge_partial_updates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = open(&dir);

        let updated = db
            .update_settings(serde_json::json!({ "exportStaggerMs": 5 }))
            .expect("update");
        assert_eq!(updated.export_stagger_ms, 5);
        assert_eq!(updated.toast_duration_ms, 3_000);
        assert_eq!(db.get_settings().expect("settings"), updated);

        let rejected = db.update_settings(serde_json::json!({ "exportDirName": "../outside" }));
        assert!(rejected.is_err());
        assert_eq!(db.get_settings().expect("settings").export_dir_name, "exports");
    }
}
