use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;

/// Whether any active (pending/accepted/in-progress) appointment for the
/// salon and date occupies a slot in `candidate_covers`. The create path
/// passes no exclusion; reschedule excludes the appointment being moved.
pub fn has_conflict(
    conn: &Connection,
    salon_id: &str,
    date: NaiveDate,
    candidate_covers: &[String],
    exclude_appointment_id: Option<&str>,
) -> Result<bool, AppError> {
    let active = queries::active_appointments_for_day(conn, salon_id, date)?;

    Ok(active
        .iter()
        .filter(|a| exclude_appointment_id != Some(a.id.as_str()))
        .any(|a| a.covers.iter().any(|label| candidate_covers.contains(label))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::models::{Appointment, AppointmentStatus};
    use chrono::Duration;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        db::queries::create_salon(&conn, &test_salon()).unwrap();
        db::queries::create_service(&conn, &test_service()).unwrap();
        conn
    }

    fn test_salon() -> crate::models::Salon {
        let now = chrono::Utc::now().naive_utc();
        crate::models::Salon {
            id: "salon-1".to_string(),
            name: "Shear Genius".to_string(),
            location: "12 High St".to_string(),
            owner_id: "owner-1".to_string(),
            phone: None,
            email: None,
            operating_hours: None,
            booking_settings: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn test_service() -> crate::models::Service {
        crate::models::Service {
            id: "svc-1".to_string(),
            salon_id: "salon-1".to_string(),
            name: "Haircut".to_string(),
            description: None,
            price: 2000,
            discount: 0,
            duration_minutes: 60,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn booking_date() -> NaiveDate {
        chrono::Utc::now().naive_utc().date() + Duration::days(7)
    }

    fn appointment(id: &str, time: &str, covers: &[&str], status: AppointmentStatus) -> Appointment {
        let now = chrono::Utc::now().naive_utc();
        Appointment {
            id: id.to_string(),
            customer_id: "cust-1".to_string(),
            salon_id: "salon-1".to_string(),
            service_id: "svc-1".to_string(),
            staff_id: None,
            date: booking_date(),
            time: time.to_string(),
            covers: covers.iter().map(|s| s.to_string()).collect(),
            status,
            amount: 2000,
            notes: None,
            accepted_at: None,
            started_at: None,
            completed_at: None,
            no_show_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn covers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_appointments_no_conflict() {
        let conn = setup_db();
        let result =
            has_conflict(&conn, "salon-1", booking_date(), &covers(&["10:00"]), None).unwrap();
        assert!(!result);
    }

    #[test]
    fn test_overlapping_run_conflicts() {
        let conn = setup_db();
        queries::create_appointment(
            &conn,
            &appointment("a1", "10:00", &["10:00", "10:30"], AppointmentStatus::Pending),
        )
        .unwrap();

        // Overlap on the tail slot, not just the start label.
        let result =
            has_conflict(&conn, "salon-1", booking_date(), &covers(&["10:30", "11:00"]), None)
                .unwrap();
        assert!(result);
    }

    #[test]
    fn test_adjacent_run_does_not_conflict() {
        let conn = setup_db();
        queries::create_appointment(
            &conn,
            &appointment("a1", "10:00", &["10:00", "10:30"], AppointmentStatus::Accepted),
        )
        .unwrap();

        let result =
            has_conflict(&conn, "salon-1", booking_date(), &covers(&["11:00", "11:30"]), None)
                .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_terminal_appointment_frees_its_run() {
        let conn = setup_db();
        queries::create_appointment(
            &conn,
            &appointment("a1", "10:00", &["10:00", "10:30"], AppointmentStatus::Cancelled),
        )
        .unwrap();

        let result =
            has_conflict(&conn, "salon-1", booking_date(), &covers(&["10:00", "10:30"]), None)
                .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_exclusion_ignores_self() {
        let conn = setup_db();
        queries::create_appointment(
            &conn,
            &appointment("a1", "10:00", &["10:00", "10:30"], AppointmentStatus::Pending),
        )
        .unwrap();

        // Rescheduling a1 onto its own run is not a conflict with itself.
        let result = has_conflict(
            &conn,
            "salon-1",
            booking_date(),
            &covers(&["10:00", "10:30"]),
            Some("a1"),
        )
        .unwrap();
        assert!(!result);
    }

    #[test]
    fn test_other_salon_does_not_conflict() {
        let conn = setup_db();
        queries::create_appointment(
            &conn,
            &appointment("a1", "10:00", &["10:00", "10:30"], AppointmentStatus::Pending),
        )
        .unwrap();

        let result =
            has_conflict(&conn, "salon-2", booking_date(), &covers(&["10:00"]), None).unwrap();
        assert!(!result);
    }
}
