use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::require_actor;
use crate::models::{Actor, BookingSettings, OperatingHours, Salon};
use crate::state::AppState;

// POST /api/salons
#[derive(Deserialize)]
pub struct CreateSalonRequest {
    pub name: String,
    pub location: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub operating_hours: Option<OperatingHours>,
    pub booking_settings: Option<BookingSettings>,
}

pub async fn create_salon(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateSalonRequest>,
) -> Result<(StatusCode, Json<Salon>), AppError> {
    let actor = require_actor(&headers)?;
    if !matches!(actor, Actor::Owner(_) | Actor::Admin(_)) {
        return Err(AppError::Authorization(
            "only owners can register salons".to_string(),
        ));
    }
    if body.name.trim().is_empty() || body.location.trim().is_empty() {
        return Err(AppError::Validation(
            "name and location are required".to_string(),
        ));
    }
    if let Some(hours) = &body.operating_hours {
        hours.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    }
    if let Some(settings) = &body.booking_settings {
        settings.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let now = Utc::now().naive_utc();
    let salon = Salon {
        id: Uuid::new_v4().to_string(),
        name: body.name,
        location: body.location,
        owner_id: actor.id().to_string(),
        phone: body.phone,
        email: body.email,
        operating_hours: body.operating_hours,
        booking_settings: body.booking_settings,
        created_at: now,
        updated_at: now,
    };

    {
        let db = state.db.lock().unwrap();
        queries::create_salon(&db, &salon)?;
    }

    tracing::info!(salon = %salon.id, owner = %salon.owner_id, "salon registered");
    Ok((StatusCode::CREATED, Json(salon)))
}

// GET /api/salons
pub async fn list_salons(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Salon>>, AppError> {
    let salons = {
        let db = state.db.lock().unwrap();
        queries::list_salons(&db)?
    };
    Ok(Json(salons))
}

// GET /api/salons/:id
pub async fn get_salon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Salon>, AppError> {
    let salon = {
        let db = state.db.lock().unwrap();
        queries::get_salon(&db, &id)?
    };
    salon
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("salon {id}")))
}

// PUT /api/salons/:id/settings
#[derive(Deserialize)]
pub struct UpdateSalonSettingsRequest {
    pub operating_hours: Option<OperatingHours>,
    pub booking_settings: Option<BookingSettings>,
}

pub async fn update_salon_settings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateSalonSettingsRequest>,
) -> Result<Json<Salon>, AppError> {
    let actor = require_actor(&headers)?;

    if let Some(hours) = &body.operating_hours {
        hours.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    }
    if let Some(settings) = &body.booking_settings {
        settings.validate().map_err(|e| AppError::Validation(e.to_string()))?;
    }

    let salon = {
        let db = state.db.lock().unwrap();
        let mut salon = queries::get_salon(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("salon {id}")))?;

        match &actor {
            Actor::Owner(owner_id) if *owner_id == salon.owner_id => {}
            Actor::Admin(_) => {}
            _ => {
                return Err(AppError::Authorization(
                    "only the salon owner can change its settings".to_string(),
                ))
            }
        }

        if let Some(hours) = body.operating_hours {
            salon.operating_hours = Some(hours);
        }
        if let Some(settings) = body.booking_settings {
            salon.booking_settings = Some(settings);
        }
        salon.updated_at = Utc::now().naive_utc();

        queries::update_salon_config(&db, &salon)?;
        salon
    };

    Ok(Json(salon))
}
