use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::{parse_date, require_actor};
use crate::models::{Actor, Appointment, AppointmentStatus};
use crate::services::appointments::{self, BookingRequest};
use crate::services::notify;
use crate::state::AppState;

#[derive(Serialize)]
pub struct AppointmentResponse {
    pub id: String,
    pub customer_id: String,
    pub salon_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub date: String,
    pub time: String,
    pub covers: Vec<String>,
    pub status: String,
    pub amount: i64,
    pub notes: Option<String>,
    pub accepted_at: Option<String>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub no_show_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(a: Appointment) -> Self {
        let fmt = |dt: chrono::NaiveDateTime| dt.format("%Y-%m-%d %H:%M:%S").to_string();
        Self {
            id: a.id,
            customer_id: a.customer_id,
            salon_id: a.salon_id,
            service_id: a.service_id,
            staff_id: a.staff_id,
            date: a.date.format("%Y-%m-%d").to_string(),
            time: a.time,
            covers: a.covers,
            status: a.status.as_str().to_string(),
            amount: a.amount,
            notes: a.notes,
            accepted_at: a.accepted_at.map(fmt),
            started_at: a.started_at.map(fmt),
            completed_at: a.completed_at.map(fmt),
            no_show_at: a.no_show_at.map(fmt),
            created_at: fmt(a.created_at),
            updated_at: fmt(a.updated_at),
        }
    }
}

/// A caller may see an appointment if they are a party to it: the booking
/// customer, the salon's owner, or salon staff/admin.
fn ensure_party(
    db: &rusqlite::Connection,
    actor: &Actor,
    appointment: &Appointment,
) -> Result<(), AppError> {
    match actor {
        Actor::Customer(id) if *id == appointment.customer_id => Ok(()),
        Actor::Customer(_) => Err(AppError::Authorization(
            "not your appointment".to_string(),
        )),
        Actor::Owner(id) => {
            let salon = queries::get_salon(db, &appointment.salon_id)?
                .ok_or_else(|| AppError::NotFound(format!("salon {}", appointment.salon_id)))?;
            if salon.owner_id == *id {
                Ok(())
            } else {
                Err(AppError::Authorization(
                    "not the owner of this salon".to_string(),
                ))
            }
        }
        Actor::Staff(_) | Actor::Admin(_) => Ok(()),
    }
}

// POST /api/appointments
#[derive(Deserialize)]
pub struct CreateAppointmentRequest {
    pub salon_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub date: String,
    pub time: String,
    pub notes: Option<String>,
}

pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    let actor = require_actor(&headers)?;
    let date = parse_date(&body.date)?;
    let now = Utc::now().naive_utc();

    let req = BookingRequest {
        salon_id: body.salon_id,
        service_id: body.service_id,
        staff_id: body.staff_id,
        date,
        time: body.time,
        notes: body.notes,
    };

    let (appointment, note) = {
        let db = state.db.lock().unwrap();
        appointments::create(&db, &actor, &req, now)?
    };
    notify::dispatch(state.notifier.as_ref(), note).await;

    Ok((StatusCode::CREATED, Json(appointment.into())))
}

// GET /api/appointments/:id
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let actor = require_actor(&headers)?;

    let appointment = {
        let db = state.db.lock().unwrap();
        let appointment = queries::get_appointment(&db, &id)?
            .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))?;
        ensure_party(&db, &actor, &appointment)?;
        appointment
    };

    Ok(Json(appointment.into()))
}

// GET /api/appointments?salon_id=...&status=...&limit=...
#[derive(Deserialize)]
pub struct AppointmentsQuery {
    pub salon_id: Option<String>,
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AppointmentsQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let actor = require_actor(&headers)?;
    let limit = query.limit.unwrap_or(50);

    let status = match query.status.as_deref() {
        Some(s) => Some(
            AppointmentStatus::parse(s)
                .ok_or_else(|| AppError::Validation(format!("unknown status: {s}")))?,
        ),
        None => None,
    };
    let status_str = status.map(|s| s.as_str());

    let appointments = {
        let db = state.db.lock().unwrap();
        match &actor {
            Actor::Customer(id) => {
                queries::list_appointments_for_customer(&db, id, status_str, limit)?
            }
            salon_side => {
                let salon_id = query.salon_id.as_deref().ok_or_else(|| {
                    AppError::Validation("salon_id is required".to_string())
                })?;
                let salon = queries::get_salon(&db, salon_id)?
                    .ok_or_else(|| AppError::NotFound(format!("salon {salon_id}")))?;
                if let Actor::Owner(id) = salon_side {
                    if *id != salon.owner_id {
                        return Err(AppError::Authorization(
                            "not the owner of this salon".to_string(),
                        ));
                    }
                }
                queries::list_appointments_for_salon(&db, salon_id, status_str, limit)?
            }
        }
    };

    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

// PATCH /api/appointments/:id/status
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let new_status = AppointmentStatus::parse(&body.status)
        .ok_or_else(|| AppError::Validation(format!("unknown status: {}", body.status)))?;
    let now = Utc::now().naive_utc();

    let (appointment, note) = {
        let db = state.db.lock().unwrap();
        appointments::update_status(&db, &actor, &id, new_status, now)?
    };
    if let Some(note) = note {
        notify::dispatch(state.notifier.as_ref(), note).await;
    }

    Ok(Json(appointment.into()))
}

// POST /api/appointments/:id/cancel
pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let now = Utc::now().naive_utc();

    let appointment = {
        let db = state.db.lock().unwrap();
        appointments::cancel(&db, &actor, &id, now)?
    };

    Ok(Json(appointment.into()))
}

// PUT /api/appointments/:id/reschedule
#[derive(Deserialize)]
pub struct RescheduleRequest {
    pub date: String,
    pub time: String,
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<RescheduleRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let actor = require_actor(&headers)?;
    let date = parse_date(&body.date)?;
    let now = Utc::now().naive_utc();

    let appointment = {
        let db = state.db.lock().unwrap();
        appointments::reschedule(&db, &actor, &id, date, &body.time, now)?
    };

    Ok(Json(appointment.into()))
}
