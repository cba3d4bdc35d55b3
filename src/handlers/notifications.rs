use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::require_actor;
use crate::models::Notification;
use crate::state::AppState;

// GET /api/notifications?limit=...
#[derive(Deserialize)]
pub struct NotificationsQuery {
    pub limit: Option<i64>,
}

pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<NotificationsQuery>,
) -> Result<Json<Vec<Notification>>, AppError> {
    let actor = require_actor(&headers)?;
    let limit = query.limit.unwrap_or(50);

    let notifications = {
        let db = state.db.lock().unwrap();
        queries::list_notifications_for_user(&db, actor.id(), limit)?
    };

    Ok(Json(notifications))
}

// POST /api/notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let actor = require_actor(&headers)?;

    let marked = {
        let db = state.db.lock().unwrap();
        queries::mark_notification_read(&db, &id, actor.id())?
    };

    if marked {
        Ok(Json(serde_json::json!({ "ok": true })))
    } else {
        Err(AppError::NotFound(format!("notification {id}")))
    }
}
