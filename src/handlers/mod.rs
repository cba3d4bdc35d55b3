pub mod appointments;
pub mod catalog;
pub mod health;
pub mod notifications;
pub mod salons;
pub mod slots;

use axum::http::HeaderMap;
use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::Actor;

/// Resolve the calling actor from the identity headers stamped by the
/// upstream auth layer.
pub(crate) fn require_actor(headers: &HeaderMap) -> Result<Actor, AppError> {
    let id = headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim();
    let role = headers
        .get("x-user-role")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if id.is_empty() {
        return Err(AppError::Authorization(
            "missing x-user-id header".to_string(),
        ));
    }
    Actor::from_parts(role, id.to_string())
        .ok_or_else(|| AppError::Authorization(format!("unknown role: {role}")))
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date: {s}")))
}
