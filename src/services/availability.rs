use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Appointment, Salon, Service};
use crate::services::policy::{self, DaySchedule, EffectiveBookingSettings};
use crate::services::slots;

/// A contiguous run of free slots large enough for one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRun {
    pub start: String,
    pub end: String,
    pub covers: Vec<String>,
}

/// Number of grid blocks a service occupies. Partial blocks round up:
/// a 45-minute service on a 30-minute grid takes 2 blocks.
pub fn blocks_needed(duration_minutes: i64, interval_minutes: i64) -> usize {
    ((duration_minutes + interval_minutes - 1) / interval_minutes) as usize
}

/// Date-level booking window checks shared by the availability listing and
/// the direct booking/reschedule path.
pub fn check_booking_window(
    date: NaiveDate,
    today: NaiveDate,
    settings: &EffectiveBookingSettings,
) -> Result<(), AppError> {
    if date < today {
        return Err(AppError::PastDate);
    }
    if date > today + Duration::days(settings.max_advance_booking_days) {
        return Err(AppError::AdvanceWindow(format!(
            "cannot book more than {} days in advance",
            settings.max_advance_booking_days
        )));
    }
    if date == today && !settings.allow_same_day_booking {
        return Err(AppError::AdvanceWindow(
            "same-day booking is not allowed".to_string(),
        ));
    }
    Ok(())
}

fn open_hours_for(salon: &Salon, date: NaiveDate) -> Result<(String, String), AppError> {
    match policy::day_schedule(salon, date.weekday()) {
        DaySchedule::Closed => Err(AppError::ClosedDay(policy::weekday_name(date.weekday()))),
        DaySchedule::Open { open, close } => Ok((open, close)),
    }
}

/// The earliest bookable start on `date`, or None when the advance cutoff
/// does not apply (future dates).
fn min_start_for(
    date: NaiveDate,
    now: NaiveDateTime,
    settings: &EffectiveBookingSettings,
) -> Option<NaiveDateTime> {
    (date == now.date() && settings.min_advance_booking_hours > 0)
        .then(|| now + Duration::hours(settings.min_advance_booking_hours))
}

/// All bookable slot-runs for one service on one date: every window of
/// `blocks_needed` consecutive grid labels that is inside the advance
/// cutoff and does not touch a slot held by an active appointment.
pub fn available_slots(
    date: NaiveDate,
    service: &Service,
    salon: &Salon,
    existing: &[Appointment],
    now: NaiveDateTime,
) -> Result<Vec<SlotRun>, AppError> {
    if service.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "service duration must be positive".to_string(),
        ));
    }

    let settings = policy::effective_settings(salon);
    check_booking_window(date, now.date(), &settings)?;
    let (open, close) = open_hours_for(salon, date)?;

    let grid = slots::generate(&open, &close, settings.slot_interval);
    let blocks = blocks_needed(service.duration_minutes, settings.slot_interval);
    let min_start = min_start_for(date, now, &settings);

    let occupied: HashSet<&str> = existing
        .iter()
        .filter(|a| a.status.is_active())
        .flat_map(|a| a.covers.iter().map(String::as_str))
        .collect();

    let mut runs = vec![];
    if blocks == 0 || grid.len() < blocks {
        return Ok(runs);
    }

    for window in grid.windows(blocks) {
        if window.iter().any(|label| occupied.contains(label.as_str())) {
            continue;
        }
        if let Some(min_start) = min_start {
            let Some(start) = slots::parse_label(&window[0]) else {
                continue;
            };
            if date.and_time(start) < min_start {
                continue;
            }
        }
        runs.push(SlotRun {
            start: window[0].clone(),
            end: window[window.len() - 1].clone(),
            covers: window.to_vec(),
        });
    }

    Ok(runs)
}

/// Resolve a requested start label to the slot labels its run covers, or
/// fail when the label is off the grid or the run passes closing time.
pub fn slot_run_for(time: &str, blocks: usize, grid: &[String]) -> Result<Vec<String>, AppError> {
    let index = grid
        .iter()
        .position(|label| label == time)
        .ok_or_else(|| AppError::SlotRange(format!("{time} is not a bookable slot")))?;
    if index + blocks > grid.len() {
        return Err(AppError::SlotRange(format!(
            "service starting at {time} would run past closing time"
        )));
    }
    Ok(grid[index..index + blocks].to_vec())
}

/// Full validation of a directly requested slot (booking and reschedule):
/// window checks, operating hours, grid alignment and the same-day advance
/// cutoff. Returns the covers for the requested run. Occupancy is the
/// conflict detector's job.
pub fn validate_requested_slot(
    date: NaiveDate,
    time: &str,
    service: &Service,
    salon: &Salon,
    now: NaiveDateTime,
) -> Result<Vec<String>, AppError> {
    if service.duration_minutes <= 0 {
        return Err(AppError::Validation(
            "service duration must be positive".to_string(),
        ));
    }

    let settings = policy::effective_settings(salon);
    check_booking_window(date, now.date(), &settings)?;
    let (open, close) = open_hours_for(salon, date)?;

    let grid = slots::generate(&open, &close, settings.slot_interval);
    let blocks = blocks_needed(service.duration_minutes, settings.slot_interval);
    let covers = slot_run_for(time, blocks, &grid)?;

    if let Some(min_start) = min_start_for(date, now, &settings) {
        let start = slots::parse_label(time)
            .ok_or_else(|| AppError::SlotRange(format!("{time} is not a bookable slot")))?;
        if date.and_time(start) < min_start {
            return Err(AppError::AdvanceWindow(format!(
                "bookings require at least {} hours notice",
                settings.min_advance_booking_hours
            )));
        }
    }

    Ok(covers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, BookingSettings, DayHours, OperatingHours};
    use chrono::NaiveTime;

    fn salon() -> Salon {
        let now = chrono::Utc::now().naive_utc();
        Salon {
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

    fn service(duration: i64) -> Service {
        Service {
            id: "svc-1".to_string(),
            salon_id: "salon-1".to_string(),
            name: "Haircut".to_string(),
            description: None,
            price: 2000,
            discount: 0,
            duration_minutes: duration,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    fn appointment(time: &str, covers: &[&str], status: AppointmentStatus) -> Appointment {
        let now = chrono::Utc::now().naive_utc();
        Appointment {
            id: format!("appt-{time}"),
            customer_id: "cust-1".to_string(),
            salon_id: "salon-1".to_string(),
            service_id: "svc-1".to_string(),
            staff_id: None,
            date: date(7),
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

    /// Noon today, so same-day cutoffs are exercised deterministically.
    fn noon_today() -> NaiveDateTime {
        chrono::Utc::now()
            .naive_utc()
            .date()
            .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap())
    }

    fn date(days_ahead: i64) -> NaiveDate {
        chrono::Utc::now().naive_utc().date() + Duration::days(days_ahead)
    }

    #[test]
    fn test_blocks_round_up() {
        assert_eq!(blocks_needed(30, 30), 1);
        assert_eq!(blocks_needed(45, 30), 2);
        assert_eq!(blocks_needed(60, 30), 2);
        assert_eq!(blocks_needed(61, 30), 3);
    }

    #[test]
    fn test_full_day_availability() {
        let runs = available_slots(date(7), &service(30), &salon(), &[], noon_today()).unwrap();
        assert_eq!(runs.len(), 18);
        assert_eq!(runs[0].start, "09:00");
        assert_eq!(runs[0].covers, vec!["09:00"]);
        assert_eq!(runs.last().unwrap().start, "17:30");
    }

    #[test]
    fn test_multi_block_windows_slide_by_one() {
        let runs = available_slots(date(7), &service(60), &salon(), &[], noon_today()).unwrap();
        // 18 labels, 2-block windows: 17 runs, the last starting 17:00.
        assert_eq!(runs.len(), 17);
        assert_eq!(runs.last().unwrap().start, "17:00");
        assert_eq!(runs.last().unwrap().covers, vec!["17:00", "17:30"]);
    }

    #[test]
    fn test_active_appointment_blocks_touching_windows() {
        let existing = [appointment(
            "10:00",
            &["10:00", "10:30"],
            AppointmentStatus::Pending,
        )];
        let runs =
            available_slots(date(7), &service(60), &salon(), &existing, noon_today()).unwrap();
        let starts: Vec<&str> = runs.iter().map(|r| r.start.as_str()).collect();
        // Any window touching 10:00 or 10:30 is gone.
        assert!(!starts.contains(&"09:30"));
        assert!(!starts.contains(&"10:00"));
        assert!(!starts.contains(&"10:30"));
        assert!(starts.contains(&"09:00"));
        assert!(starts.contains(&"11:00"));
    }

    #[test]
    fn test_terminal_appointments_never_block() {
        for status in [
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
            AppointmentStatus::NoShow,
            AppointmentStatus::Rejected,
        ] {
            let existing = [appointment("10:00", &["10:00", "10:30"], status)];
            let runs =
                available_slots(date(7), &service(60), &salon(), &existing, noon_today()).unwrap();
            assert_eq!(runs.len(), 17, "{status:?} should not block");
        }
    }

    #[test]
    fn test_past_date_rejected() {
        let err = available_slots(date(-1), &service(30), &salon(), &[], noon_today()).unwrap_err();
        assert!(matches!(err, AppError::PastDate));
    }

    #[test]
    fn test_advance_window_boundary() {
        // Default max_advance_booking_days = 30: today+30 books, today+31 fails.
        assert!(available_slots(date(30), &service(30), &salon(), &[], noon_today()).is_ok());
        let err = available_slots(date(31), &service(30), &salon(), &[], noon_today()).unwrap_err();
        assert!(matches!(err, AppError::AdvanceWindow(_)));
    }

    #[test]
    fn test_closed_day_rejected() {
        let target = date(7);
        let mut s = salon();
        let mut days = std::collections::HashMap::new();
        days.insert(
            policy::weekday_name(target.weekday()).to_string(),
            DayHours {
                closed: true,
                ..Default::default()
            },
        );
        s.operating_hours = Some(OperatingHours { days });

        let err = available_slots(target, &service(30), &s, &[], noon_today()).unwrap_err();
        assert!(matches!(err, AppError::ClosedDay(_)));
    }

    #[test]
    fn test_same_day_disallowed() {
        let mut s = salon();
        s.booking_settings = Some(BookingSettings {
            allow_same_day_booking: Some(false),
            ..Default::default()
        });
        let err = available_slots(date(0), &service(30), &s, &[], noon_today()).unwrap_err();
        assert!(matches!(err, AppError::AdvanceWindow(_)));
    }

    #[test]
    fn test_same_day_cutoff_filters_early_slots() {
        // At noon with a 2-hour minimum, nothing before 14:00 is offered.
        let runs = available_slots(date(0), &service(30), &salon(), &[], noon_today()).unwrap();
        assert_eq!(runs[0].start, "14:00");
        assert!(runs.iter().all(|r| r.start.as_str() >= "14:00"));
    }

    #[test]
    fn test_cutoff_does_not_apply_to_future_dates() {
        let runs = available_slots(date(1), &service(30), &salon(), &[], noon_today()).unwrap();
        assert_eq!(runs[0].start, "09:00");
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let err = available_slots(date(7), &service(0), &salon(), &[], noon_today()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_slot_run_for_resolves_covers() {
        let grid = slots::generate("09:00", "18:00", 30);
        assert_eq!(slot_run_for("17:00", 2, &grid).unwrap(), vec!["17:00", "17:30"]);
    }

    #[test]
    fn test_slot_run_past_closing_rejected() {
        // 60-minute service at 17:30 would run to 18:30.
        let grid = slots::generate("09:00", "18:00", 30);
        let err = slot_run_for("17:30", 2, &grid).unwrap_err();
        assert!(matches!(err, AppError::SlotRange(_)));
    }

    #[test]
    fn test_off_grid_label_rejected() {
        let grid = slots::generate("09:00", "18:00", 30);
        let err = slot_run_for("09:15", 1, &grid).unwrap_err();
        assert!(matches!(err, AppError::SlotRange(_)));
    }

    #[test]
    fn test_validate_requested_slot_happy_path() {
        let covers =
            validate_requested_slot(date(7), "17:00", &service(60), &salon(), noon_today())
                .unwrap();
        assert_eq!(covers, vec!["17:00", "17:30"]);
    }

    #[test]
    fn test_validate_requested_slot_same_day_cutoff() {
        let err = validate_requested_slot(date(0), "13:00", &service(30), &salon(), noon_today())
            .unwrap_err();
        assert!(matches!(err, AppError::AdvanceWindow(_)));

        let covers =
            validate_requested_slot(date(0), "14:00", &service(30), &salon(), noon_today())
                .unwrap();
        assert_eq!(covers, vec!["14:00"]);
    }
}
