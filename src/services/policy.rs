use chrono::Weekday;

use crate::models::Salon;

pub const DEFAULT_MIN_ADVANCE_BOOKING_HOURS: i64 = 2;
pub const DEFAULT_MAX_ADVANCE_BOOKING_DAYS: i64 = 30;
pub const DEFAULT_SLOT_INTERVAL_MINUTES: i64 = 30;
pub const DEFAULT_ALLOW_SAME_DAY_BOOKING: bool = true;
pub const DEFAULT_CANCELLATION_HOURS: i64 = 24;

pub const DEFAULT_OPENING: &str = "09:00";
pub const DEFAULT_CLOSING: &str = "18:00";

/// A salon's booking settings with every unset field replaced by the
/// system default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveBookingSettings {
    pub min_advance_booking_hours: i64,
    pub max_advance_booking_days: i64,
    pub slot_interval: i64,
    pub allow_same_day_booking: bool,
    pub cancellation_hours: i64,
}

impl Default for EffectiveBookingSettings {
    fn default() -> Self {
        Self {
            min_advance_booking_hours: DEFAULT_MIN_ADVANCE_BOOKING_HOURS,
            max_advance_booking_days: DEFAULT_MAX_ADVANCE_BOOKING_DAYS,
            slot_interval: DEFAULT_SLOT_INTERVAL_MINUTES,
            allow_same_day_booking: DEFAULT_ALLOW_SAME_DAY_BOOKING,
            cancellation_hours: DEFAULT_CANCELLATION_HOURS,
        }
    }
}

pub fn effective_settings(salon: &Salon) -> EffectiveBookingSettings {
    let defaults = EffectiveBookingSettings::default();
    let Some(configured) = &salon.booking_settings else {
        return defaults;
    };
    EffectiveBookingSettings {
        min_advance_booking_hours: configured
            .min_advance_booking_hours
            .unwrap_or(defaults.min_advance_booking_hours),
        max_advance_booking_days: configured
            .max_advance_booking_days
            .unwrap_or(defaults.max_advance_booking_days),
        slot_interval: configured
            .slot_interval
            .filter(|interval| *interval > 0)
            .unwrap_or(defaults.slot_interval),
        allow_same_day_booking: configured
            .allow_same_day_booking
            .unwrap_or(defaults.allow_same_day_booking),
        cancellation_hours: configured
            .cancellation_hours
            .unwrap_or(defaults.cancellation_hours),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySchedule {
    Open { open: String, close: String },
    Closed,
}

/// Resolve a salon's hours for one weekday. A salon with no operating-hours
/// configuration at all is open with default hours every day, and a day
/// absent from an existing configuration is still open with default hours:
/// absence is not closure, only an explicit `closed: true` is. Salons
/// predate the operating-hours config, so this asymmetry must stay.
pub fn day_schedule(salon: &Salon, weekday: Weekday) -> DaySchedule {
    let name = weekday_name(weekday);
    let configured = salon
        .operating_hours
        .as_ref()
        .and_then(|hours| hours.days.get(name));

    match configured {
        Some(day) if day.closed => DaySchedule::Closed,
        Some(day) => DaySchedule::Open {
            open: day.open.clone().unwrap_or_else(|| DEFAULT_OPENING.to_string()),
            close: day
                .close
                .clone()
                .unwrap_or_else(|| DEFAULT_CLOSING.to_string()),
        },
        None => DaySchedule::Open {
            open: DEFAULT_OPENING.to_string(),
            close: DEFAULT_CLOSING.to_string(),
        },
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingSettings, DayHours, OperatingHours};

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

    #[test]
    fn test_defaults_when_unconfigured() {
        let settings = effective_settings(&salon());
        assert_eq!(settings, EffectiveBookingSettings::default());
        assert_eq!(settings.min_advance_booking_hours, 2);
        assert_eq!(settings.max_advance_booking_days, 30);
        assert_eq!(settings.slot_interval, 30);
        assert!(settings.allow_same_day_booking);
        assert_eq!(settings.cancellation_hours, 24);
    }

    #[test]
    fn test_partial_settings_only_fill_gaps() {
        let mut s = salon();
        s.booking_settings = Some(BookingSettings {
            slot_interval: Some(15),
            cancellation_hours: Some(48),
            ..Default::default()
        });
        let settings = effective_settings(&s);
        assert_eq!(settings.slot_interval, 15);
        assert_eq!(settings.cancellation_hours, 48);
        assert_eq!(settings.min_advance_booking_hours, 2);
        assert_eq!(settings.max_advance_booking_days, 30);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut s = salon();
        s.booking_settings = Some(BookingSettings {
            max_advance_booking_days: Some(14),
            ..Default::default()
        });
        assert_eq!(effective_settings(&s), effective_settings(&s));
    }

    #[test]
    fn test_no_operating_hours_means_open_every_day() {
        let s = salon();
        for weekday in [Weekday::Mon, Weekday::Sat, Weekday::Sun] {
            assert_eq!(
                day_schedule(&s, weekday),
                DaySchedule::Open {
                    open: "09:00".to_string(),
                    close: "18:00".to_string()
                }
            );
        }
    }

    #[test]
    fn test_absent_day_defaults_to_open() {
        let mut s = salon();
        let mut days = std::collections::HashMap::new();
        days.insert(
            "sunday".to_string(),
            DayHours {
                closed: true,
                ..Default::default()
            },
        );
        s.operating_hours = Some(OperatingHours { days });

        // Sunday is explicitly closed; Monday is absent from the map and
        // therefore still open with default hours.
        assert_eq!(day_schedule(&s, Weekday::Sun), DaySchedule::Closed);
        assert_eq!(
            day_schedule(&s, Weekday::Mon),
            DaySchedule::Open {
                open: "09:00".to_string(),
                close: "18:00".to_string()
            }
        );
    }

    #[test]
    fn test_configured_day_hours() {
        let mut s = salon();
        let mut days = std::collections::HashMap::new();
        days.insert(
            "tuesday".to_string(),
            DayHours {
                open: Some("10:00".to_string()),
                close: Some("20:00".to_string()),
                closed: false,
            },
        );
        s.operating_hours = Some(OperatingHours { days });
        assert_eq!(
            day_schedule(&s, Weekday::Tue),
            DaySchedule::Open {
                open: "10:00".to_string(),
                close: "20:00".to_string()
            }
        );
    }

    #[test]
    fn test_partial_day_hours_fill_from_defaults() {
        let mut s = salon();
        let mut days = std::collections::HashMap::new();
        days.insert(
            "friday".to_string(),
            DayHours {
                open: Some("11:00".to_string()),
                close: None,
                closed: false,
            },
        );
        s.operating_hours = Some(OperatingHours { days });
        assert_eq!(
            day_schedule(&s, Weekday::Fri),
            DaySchedule::Open {
                open: "11:00".to_string(),
                close: "18:00".to_string()
            }
        );
    }
}
