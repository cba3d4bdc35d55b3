use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Appointment, AppointmentStatus, BookingSettings, Notification, NotificationKind,
    OperatingHours, Salon, Service,
};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Salons ──

pub fn create_salon(conn: &Connection, salon: &Salon) -> anyhow::Result<()> {
    let operating_hours = salon
        .operating_hours
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let booking_settings = salon
        .booking_settings
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    conn.execute(
        "INSERT INTO salons (id, name, location, owner_id, phone, email, operating_hours, booking_settings, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            salon.id,
            salon.name,
            salon.location,
            salon.owner_id,
            salon.phone,
            salon.email,
            operating_hours,
            booking_settings,
            format_datetime(salon.created_at),
            format_datetime(salon.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_salon(conn: &Connection, id: &str) -> anyhow::Result<Option<Salon>> {
    let result = conn.query_row(
        "SELECT id, name, location, owner_id, phone, email, operating_hours, booking_settings, created_at, updated_at
         FROM salons WHERE id = ?1",
        params![id],
        |row| Ok(parse_salon_row(row)),
    );

    match result {
        Ok(salon) => Ok(Some(salon?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_salons(conn: &Connection) -> anyhow::Result<Vec<Salon>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, location, owner_id, phone, email, operating_hours, booking_settings, created_at, updated_at
         FROM salons ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map([], |row| Ok(parse_salon_row(row)))?;

    let mut salons = vec![];
    for row in rows {
        salons.push(row??);
    }
    Ok(salons)
}

/// Persist a salon's operating-hours and booking-settings configuration.
pub fn update_salon_config(conn: &Connection, salon: &Salon) -> anyhow::Result<bool> {
    let operating_hours = salon
        .operating_hours
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let booking_settings = salon
        .booking_settings
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    let count = conn.execute(
        "UPDATE salons SET operating_hours = ?1, booking_settings = ?2, updated_at = ?3 WHERE id = ?4",
        params![
            operating_hours,
            booking_settings,
            format_datetime(salon.updated_at),
            salon.id,
        ],
    )?;
    Ok(count > 0)
}

fn parse_salon_row(row: &rusqlite::Row) -> anyhow::Result<Salon> {
    let operating_hours_json: Option<String> = row.get(6)?;
    let booking_settings_json: Option<String> = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    let operating_hours: Option<OperatingHours> = operating_hours_json
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok());
    let booking_settings: Option<BookingSettings> = booking_settings_json
        .as_deref()
        .and_then(|s| serde_json::from_str(s).ok());

    Ok(Salon {
        id: row.get(0)?,
        name: row.get(1)?,
        location: row.get(2)?,
        owner_id: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        operating_hours,
        booking_settings,
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Services ──

pub fn create_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, salon_id, name, description, price, discount, duration_minutes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            service.id,
            service.salon_id,
            service.name,
            service.description,
            service.price,
            service.discount,
            service.duration_minutes,
            format_datetime(service.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, salon_id, name, description, price, discount, duration_minutes, created_at
         FROM services WHERE id = ?1",
        params![id],
        |row| Ok(parse_service_row(row)),
    );

    match result {
        Ok(service) => Ok(Some(service?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_services_for_salon(conn: &Connection, salon_id: &str) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, salon_id, name, description, price, discount, duration_minutes, created_at
         FROM services WHERE salon_id = ?1 ORDER BY created_at ASC",
    )?;
    let rows = stmt.query_map(params![salon_id], |row| Ok(parse_service_row(row)))?;

    let mut services = vec![];
    for row in rows {
        services.push(row??);
    }
    Ok(services)
}

fn parse_service_row(row: &rusqlite::Row) -> anyhow::Result<Service> {
    let created_at_str: String = row.get(7)?;
    Ok(Service {
        id: row.get(0)?,
        salon_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        discount: row.get(5)?,
        duration_minutes: row.get(6)?,
        created_at: parse_datetime(&created_at_str),
    })
}

// ── Appointments ──

const APPOINTMENT_COLUMNS: &str =
    "id, customer_id, salon_id, service_id, staff_id, date, time, covers, status, amount, notes,
     accepted_at, started_at, completed_at, no_show_at, created_at, updated_at";

pub fn create_appointment(conn: &Connection, appointment: &Appointment) -> anyhow::Result<()> {
    let covers = serde_json::to_string(&appointment.covers)?;
    conn.execute(
        "INSERT INTO appointments (id, customer_id, salon_id, service_id, staff_id, date, time, covers, status, amount, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            appointment.id,
            appointment.customer_id,
            appointment.salon_id,
            appointment.service_id,
            appointment.staff_id,
            appointment.date.format(DATE_FORMAT).to_string(),
            appointment.time,
            covers,
            appointment.status.as_str(),
            appointment.amount,
            appointment.notes,
            format_datetime(appointment.created_at),
            format_datetime(appointment.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &str) -> anyhow::Result<Option<Appointment>> {
    let result = conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id],
        |row| Ok(parse_appointment_row(row)),
    );

    match result {
        Ok(appointment) => Ok(Some(appointment?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Appointments still occupying their slot-run on the given day.
pub fn active_appointments_for_day(
    conn: &Connection,
    salon_id: &str,
    date: NaiveDate,
) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE salon_id = ?1 AND date = ?2 AND status IN ('pending', 'accepted', 'in-progress')
         ORDER BY time ASC"
    ))?;
    let rows = stmt.query_map(
        params![salon_id, date.format(DATE_FORMAT).to_string()],
        |row| Ok(parse_appointment_row(row)),
    )?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn list_appointments_for_customer(
    conn: &Connection,
    customer_id: &str,
    status: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE customer_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY date DESC, time DESC LIMIT ?3"
    ))?;
    let rows = stmt.query_map(params![customer_id, status, limit], |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

pub fn list_appointments_for_salon(
    conn: &Connection,
    salon_id: &str,
    status: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Appointment>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {APPOINTMENT_COLUMNS} FROM appointments
         WHERE salon_id = ?1 AND (?2 IS NULL OR status = ?2)
         ORDER BY date DESC, time DESC LIMIT ?3"
    ))?;
    let rows = stmt.query_map(params![salon_id, status, limit], |row| {
        Ok(parse_appointment_row(row))
    })?;

    let mut appointments = vec![];
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

/// Guarded status write: only succeeds while the row still holds `from`,
/// so a transition validated on a stale read cannot clobber a newer state.
/// Stamps the lifecycle timestamp matching the target status.
pub fn transition_status(
    conn: &Connection,
    id: &str,
    from: AppointmentStatus,
    to: AppointmentStatus,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let timestamp_column = match to {
        AppointmentStatus::Accepted => Some("accepted_at"),
        AppointmentStatus::InProgress => Some("started_at"),
        AppointmentStatus::Completed => Some("completed_at"),
        AppointmentStatus::NoShow => Some("no_show_at"),
        _ => None,
    };
    let now_str = format_datetime(now);

    let count = match timestamp_column {
        Some(column) => conn.execute(
            &format!(
                "UPDATE appointments SET status = ?1, {column} = ?2, updated_at = ?2
                 WHERE id = ?3 AND status = ?4"
            ),
            params![to.as_str(), now_str, id, from.as_str()],
        )?,
        None => conn.execute(
            "UPDATE appointments SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![to.as_str(), now_str, id, from.as_str()],
        )?,
    };
    Ok(count > 0)
}

/// Guarded reschedule write: moves date/time/covers in place while the
/// status still matches the one the caller validated against.
pub fn update_schedule(
    conn: &Connection,
    id: &str,
    date: NaiveDate,
    time: &str,
    covers: &[String],
    expected_status: AppointmentStatus,
    now: NaiveDateTime,
) -> anyhow::Result<bool> {
    let covers_json = serde_json::to_string(covers)?;
    let count = conn.execute(
        "UPDATE appointments SET date = ?1, time = ?2, covers = ?3, updated_at = ?4
         WHERE id = ?5 AND status = ?6",
        params![
            date.format(DATE_FORMAT).to_string(),
            time,
            covers_json,
            format_datetime(now),
            id,
            expected_status.as_str(),
        ],
    )?;
    Ok(count > 0)
}

fn parse_appointment_row(row: &rusqlite::Row) -> anyhow::Result<Appointment> {
    let date_str: String = row.get(5)?;
    let covers_json: String = row.get(7)?;
    let status_str: String = row.get(8)?;
    let accepted_at: Option<String> = row.get(11)?;
    let started_at: Option<String> = row.get(12)?;
    let completed_at: Option<String> = row.get(13)?;
    let no_show_at: Option<String> = row.get(14)?;
    let created_at_str: String = row.get(15)?;
    let updated_at_str: String = row.get(16)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .unwrap_or_else(|_| Utc::now().naive_utc().date());
    let covers: Vec<String> = serde_json::from_str(&covers_json).unwrap_or_default();

    Ok(Appointment {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        salon_id: row.get(2)?,
        service_id: row.get(3)?,
        staff_id: row.get(4)?,
        date,
        time: row.get(6)?,
        covers,
        status: AppointmentStatus::parse(&status_str).unwrap_or(AppointmentStatus::Pending),
        amount: row.get(9)?,
        notes: row.get(10)?,
        accepted_at: accepted_at.as_deref().map(parse_datetime),
        started_at: started_at.as_deref().map(parse_datetime),
        completed_at: completed_at.as_deref().map(parse_datetime),
        no_show_at: no_show_at.as_deref().map(parse_datetime),
        created_at: parse_datetime(&created_at_str),
        updated_at: parse_datetime(&updated_at_str),
    })
}

// ── Notifications ──

pub fn insert_notification(conn: &Connection, notification: &Notification) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO notifications (id, user_id, kind, message, appointment_id, salon_id, is_read, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            notification.id,
            notification.user_id,
            notification.kind.as_str(),
            notification.message,
            notification.appointment_id,
            notification.salon_id,
            notification.is_read as i32,
            format_datetime(notification.created_at),
        ],
    )?;
    Ok(())
}

pub fn list_notifications_for_user(
    conn: &Connection,
    user_id: &str,
    limit: i64,
) -> anyhow::Result<Vec<Notification>> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, message, appointment_id, salon_id, is_read, created_at
         FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![user_id, limit], |row| {
        Ok(parse_notification_row(row))
    })?;

    let mut notifications = vec![];
    for row in rows {
        notifications.push(row??);
    }
    Ok(notifications)
}

pub fn mark_notification_read(conn: &Connection, id: &str, user_id: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE notifications SET is_read = 1 WHERE id = ?1 AND user_id = ?2",
        params![id, user_id],
    )?;
    Ok(count > 0)
}

fn parse_notification_row(row: &rusqlite::Row) -> anyhow::Result<Notification> {
    let kind_str: String = row.get(2)?;
    let is_read: i32 = row.get(6)?;
    let created_at_str: String = row.get(7)?;

    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: NotificationKind::parse(&kind_str).unwrap_or(NotificationKind::AppointmentCreated),
        message: row.get(3)?,
        appointment_id: row.get(4)?,
        salon_id: row.get(5)?,
        is_read: is_read != 0,
        created_at: parse_datetime(&created_at_str),
    })
}
