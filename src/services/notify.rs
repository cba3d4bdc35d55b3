use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::models::{Notification, NotificationKind};

/// A notification the scheduling core wants delivered to a user. The core
/// only produces these; delivery is the sink's problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundNotification {
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub appointment_id: String,
    pub salon_id: String,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, note: OutboundNotification) -> anyhow::Result<()>;
}

/// Default sink: persists notifications so users can poll them over the API.
pub struct SqliteNotificationSink {
    db: Arc<Mutex<Connection>>,
}

impl SqliteNotificationSink {
    pub fn new(db: Arc<Mutex<Connection>>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationSink for SqliteNotificationSink {
    async fn notify(&self, note: OutboundNotification) -> anyhow::Result<()> {
        let notification = Notification {
            id: Uuid::new_v4().to_string(),
            user_id: note.user_id,
            kind: note.kind,
            message: note.message,
            appointment_id: Some(note.appointment_id),
            salon_id: Some(note.salon_id),
            is_read: false,
            created_at: Utc::now().naive_utc(),
        };
        let db = self.db.lock().unwrap();
        queries::insert_notification(&db, &notification)
    }
}

/// Deliver fire-and-forget: a failed notification is logged and never
/// bubbles into the appointment transition's result.
pub async fn dispatch(sink: &dyn NotificationSink, note: OutboundNotification) {
    let kind = note.kind;
    let user_id = note.user_id.clone();
    if let Err(e) = sink.notify(note).await {
        tracing::warn!(error = %e, user_id, kind = kind.as_str(), "failed to deliver notification");
    }
}
