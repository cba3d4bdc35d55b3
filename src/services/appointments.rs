use chrono::{Duration, NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use uuid::Uuid;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Actor, Appointment, AppointmentStatus, NotificationKind, Salon, Service};
use crate::services::availability;
use crate::services::conflict;
use crate::services::notify::OutboundNotification;
use crate::services::policy;

pub struct BookingRequest {
    pub salon_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub date: NaiveDate,
    pub time: String,
    pub notes: Option<String>,
}

fn load_salon(conn: &Connection, id: &str) -> Result<Salon, AppError> {
    queries::get_salon(conn, id)?.ok_or_else(|| AppError::NotFound(format!("salon {id}")))
}

fn load_service(conn: &Connection, id: &str) -> Result<Service, AppError> {
    queries::get_service(conn, id)?.ok_or_else(|| AppError::NotFound(format!("service {id}")))
}

fn load_appointment(conn: &Connection, id: &str) -> Result<Appointment, AppError> {
    queries::get_appointment(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("appointment {id}")))
}

/// Owners may only act on their own salon; staff and admins pass through.
fn ensure_salon_access(actor: &Actor, salon: &Salon) -> Result<(), AppError> {
    match actor {
        Actor::Owner(id) if *id != salon.owner_id => Err(AppError::Authorization(
            "not the owner of this salon".to_string(),
        )),
        Actor::Customer(_) => Err(AppError::Authorization(
            "customers cannot perform this action".to_string(),
        )),
        _ => Ok(()),
    }
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// Book a new appointment: validate the requested slot against policy and
/// operating hours, check the run for conflicts, persist as `pending` with
/// the price frozen, and address a notification to the salon owner.
pub fn create(
    conn: &Connection,
    actor: &Actor,
    req: &BookingRequest,
    now: NaiveDateTime,
) -> Result<(Appointment, OutboundNotification), AppError> {
    let Actor::Customer(customer_id) = actor else {
        return Err(AppError::Authorization(
            "only customers can book appointments".to_string(),
        ));
    };
    if req.time.trim().is_empty() {
        return Err(AppError::Validation("time is required".to_string()));
    }

    let salon = load_salon(conn, &req.salon_id)?;
    let service = load_service(conn, &req.service_id)?;
    if service.salon_id != salon.id {
        return Err(AppError::Validation(
            "service does not belong to this salon".to_string(),
        ));
    }
    service.validate().map_err(AppError::Validation)?;

    let covers = availability::validate_requested_slot(req.date, &req.time, &service, &salon, now)?;

    if conflict::has_conflict(conn, &salon.id, req.date, &covers, None)? {
        return Err(AppError::Conflict);
    }

    let appointment = Appointment {
        id: Uuid::new_v4().to_string(),
        customer_id: customer_id.clone(),
        salon_id: salon.id.clone(),
        service_id: service.id.clone(),
        staff_id: req.staff_id.clone(),
        date: req.date,
        time: req.time.clone(),
        covers,
        status: AppointmentStatus::Pending,
        amount: service.final_price(),
        notes: req.notes.clone(),
        accepted_at: None,
        started_at: None,
        completed_at: None,
        no_show_at: None,
        created_at: now,
        updated_at: now,
    };

    // The partial unique index on active (salon, date, time) backs up the
    // conflict check if a second writer slips past it.
    match queries::create_appointment(conn, &appointment) {
        Ok(()) => {}
        Err(e) if is_unique_violation(&e) => return Err(AppError::Conflict),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(
        appointment = %appointment.id,
        salon = %salon.id,
        date = %req.date,
        time = %req.time,
        "appointment booked"
    );

    let note = OutboundNotification {
        user_id: salon.owner_id.clone(),
        kind: NotificationKind::AppointmentCreated,
        message: format!(
            "New booking request: {} on {} at {}",
            service.name, req.date, req.time
        ),
        appointment_id: appointment.id.clone(),
        salon_id: salon.id,
    };

    Ok((appointment, note))
}

/// Salon-side lifecycle transition (accept/reject/start/complete/no-show).
/// Accept and reject each address one notification to the customer.
pub fn update_status(
    conn: &Connection,
    actor: &Actor,
    id: &str,
    new_status: AppointmentStatus,
    now: NaiveDateTime,
) -> Result<(Appointment, Option<OutboundNotification>), AppError> {
    if new_status == AppointmentStatus::Cancelled {
        return Err(AppError::Validation(
            "use the cancel endpoint to cancel an appointment".to_string(),
        ));
    }

    let appointment = load_appointment(conn, id)?;
    let salon = load_salon(conn, &appointment.salon_id)?;
    ensure_salon_access(actor, &salon)?;

    if !appointment.status.can_transition_to(new_status) {
        return Err(AppError::IllegalTransition(format!(
            "cannot change status from {} to {}",
            appointment.status.as_str(),
            new_status.as_str()
        )));
    }

    if !queries::transition_status(conn, id, appointment.status, new_status, now)? {
        return Err(AppError::IllegalTransition(format!(
            "appointment is no longer {}",
            appointment.status.as_str()
        )));
    }

    let updated = load_appointment(conn, id)?;
    tracing::info!(
        appointment = %id,
        from = appointment.status.as_str(),
        to = new_status.as_str(),
        "appointment status updated"
    );

    let note = match new_status {
        AppointmentStatus::Accepted => Some(OutboundNotification {
            user_id: updated.customer_id.clone(),
            kind: NotificationKind::AppointmentAccepted,
            message: format!(
                "Your appointment on {} at {} was accepted",
                updated.date, updated.time
            ),
            appointment_id: updated.id.clone(),
            salon_id: updated.salon_id.clone(),
        }),
        AppointmentStatus::Rejected => Some(OutboundNotification {
            user_id: updated.customer_id.clone(),
            kind: NotificationKind::AppointmentRejected,
            message: format!(
                "Your appointment on {} at {} was rejected",
                updated.date, updated.time
            ),
            appointment_id: updated.id.clone(),
            salon_id: updated.salon_id.clone(),
        }),
        _ => None,
    };

    Ok((updated, note))
}

/// Cancel from any non-terminal state. Customers may only cancel their own
/// appointments and only outside the salon's cancellation window; the salon
/// side is not bound by the window.
pub fn cancel(
    conn: &Connection,
    actor: &Actor,
    id: &str,
    now: NaiveDateTime,
) -> Result<Appointment, AppError> {
    let appointment = load_appointment(conn, id)?;
    if appointment.status.is_terminal() {
        return Err(AppError::IllegalTransition(format!(
            "cannot cancel a {} appointment",
            appointment.status.as_str()
        )));
    }
    let salon = load_salon(conn, &appointment.salon_id)?;

    match actor {
        Actor::Customer(customer_id) => {
            if *customer_id != appointment.customer_id {
                return Err(AppError::Authorization(
                    "customers may only cancel their own appointments".to_string(),
                ));
            }
            let settings = policy::effective_settings(&salon);
            let starts_at = appointment.starts_at().ok_or_else(|| {
                AppError::Validation("appointment has a malformed time".to_string())
            })?;
            if now + Duration::hours(settings.cancellation_hours) > starts_at {
                return Err(AppError::PolicyViolation(format!(
                    "appointments must be cancelled at least {} hours in advance",
                    settings.cancellation_hours
                )));
            }
        }
        other => ensure_salon_access(other, &salon)?,
    }

    if !queries::transition_status(conn, id, appointment.status, AppointmentStatus::Cancelled, now)?
    {
        return Err(AppError::IllegalTransition(format!(
            "appointment is no longer {}",
            appointment.status.as_str()
        )));
    }

    tracing::info!(appointment = %id, actor = actor.role(), "appointment cancelled");
    load_appointment(conn, id)
}

/// Move a non-terminal appointment to a new date/time. The new slot goes
/// through the same window validation as a fresh booking and a conflict
/// check that ignores the appointment itself; status and pricing are kept.
pub fn reschedule(
    conn: &Connection,
    actor: &Actor,
    id: &str,
    new_date: NaiveDate,
    new_time: &str,
    now: NaiveDateTime,
) -> Result<Appointment, AppError> {
    let appointment = load_appointment(conn, id)?;
    if appointment.status.is_terminal() {
        return Err(AppError::IllegalTransition(format!(
            "cannot reschedule a {} appointment",
            appointment.status.as_str()
        )));
    }
    let salon = load_salon(conn, &appointment.salon_id)?;

    match actor {
        Actor::Customer(customer_id) => {
            if *customer_id != appointment.customer_id {
                return Err(AppError::Authorization(
                    "customers may only reschedule their own appointments".to_string(),
                ));
            }
        }
        other => ensure_salon_access(other, &salon)?,
    }

    let service = load_service(conn, &appointment.service_id)?;
    let covers = availability::validate_requested_slot(new_date, new_time, &service, &salon, now)?;

    if conflict::has_conflict(conn, &salon.id, new_date, &covers, Some(id))? {
        return Err(AppError::Conflict);
    }

    let moved = match queries::update_schedule(
        conn,
        id,
        new_date,
        new_time,
        &covers,
        appointment.status,
        now,
    ) {
        Ok(moved) => moved,
        Err(e) if is_unique_violation(&e) => return Err(AppError::Conflict),
        Err(e) => return Err(e.into()),
    };
    if !moved {
        return Err(AppError::IllegalTransition(format!(
            "appointment is no longer {}",
            appointment.status.as_str()
        )));
    }

    tracing::info!(
        appointment = %id,
        date = %new_date,
        time = new_time,
        "appointment rescheduled"
    );
    load_appointment(conn, id)
}
