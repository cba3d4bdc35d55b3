use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::parse_date;
use crate::services::availability::{self, SlotRun};
use crate::state::AppState;

// GET /api/slots?date=YYYY-MM-DD&service_id=...&salon_id=...
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: String,
    pub service_id: String,
    pub salon_id: String,
}

#[derive(Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<SlotRun>,
}

pub async fn get_available_slots(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let date = parse_date(&query.date)?;
    let now = Utc::now().naive_utc();

    let slots = {
        let db = state.db.lock().unwrap();
        let salon = queries::get_salon(&db, &query.salon_id)?
            .ok_or_else(|| AppError::NotFound(format!("salon {}", query.salon_id)))?;
        let service = queries::get_service(&db, &query.service_id)?
            .ok_or_else(|| AppError::NotFound(format!("service {}", query.service_id)))?;
        if service.salon_id != salon.id {
            return Err(AppError::Validation(
                "service does not belong to this salon".to_string(),
            ));
        }

        let existing = queries::active_appointments_for_day(&db, &salon.id, date)?;
        availability::available_slots(date, &service, &salon, &existing, now)?
    };

    Ok(Json(SlotsResponse { slots }))
}
