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
use crate::models::{Actor, Service};
use crate::state::AppState;

// POST /api/services
#[derive(Deserialize)]
pub struct CreateServiceRequest {
    pub salon_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub discount: i64,
    pub duration_minutes: i64,
}

pub async fn create_service(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    let actor = require_actor(&headers)?;

    let service = Service {
        id: Uuid::new_v4().to_string(),
        salon_id: body.salon_id,
        name: body.name,
        description: body.description,
        price: body.price,
        discount: body.discount,
        duration_minutes: body.duration_minutes,
        created_at: Utc::now().naive_utc(),
    };
    service.validate().map_err(AppError::Validation)?;

    {
        let db = state.db.lock().unwrap();
        let salon = queries::get_salon(&db, &service.salon_id)?
            .ok_or_else(|| AppError::NotFound(format!("salon {}", service.salon_id)))?;

        match &actor {
            Actor::Owner(owner_id) if *owner_id == salon.owner_id => {}
            Actor::Admin(_) => {}
            _ => {
                return Err(AppError::Authorization(
                    "only the salon owner can add services".to_string(),
                ))
            }
        }

        queries::create_service(&db, &service)?;
    }

    tracing::info!(service = %service.id, salon = %service.salon_id, "service added");
    Ok((StatusCode::CREATED, Json(service)))
}

// GET /api/salons/:id/services
pub async fn list_salon_services(
    State(state): State<Arc<AppState>>,
    Path(salon_id): Path<String>,
) -> Result<Json<Vec<Service>>, AppError> {
    let services = {
        let db = state.db.lock().unwrap();
        if queries::get_salon(&db, &salon_id)?.is_none() {
            return Err(AppError::NotFound(format!("salon {salon_id}")));
        }
        queries::list_services_for_salon(&db, &salon_id)?
    };
    Ok(Json(services))
}
