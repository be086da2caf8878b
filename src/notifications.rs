use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const MAX_PENDING_NOTIFICATIONS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// A user-facing toast. The front end decides how to draw and dismiss it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub message: String,
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
}

/// Bounded outbox of notifications not yet picked up by the shell.
#[derive(Clone, Default)]
pub struct NotificationCenter {
    pending: Arc<Mutex<VecDeque<Notification>>>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: NotificationLevel, message: impl Into<String>, duration_ms: u64) -> Notification {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            level,
            message: message.into(),
            duration_ms,
            created_at: Utc::now(),
        };
        tracing::debug!(level = level.as_str(), message = %notification.message, "notification queued");

        if let Ok(mut pending) = self.pending.lock() {
            pending.push_back(notification.clone());
            while pending.len() > MAX_PENDING_NOTIFICATIONS {
                pending.pop_front();
            }
        }
        notification
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.pending
            .lock()
            .map(|mut pending| pending.drain(..).collect())
            .unwrap_or_default()
    }
}
