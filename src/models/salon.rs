use std::collections::HashMap;

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Salon {
    pub id: String,
    pub name: String,
    pub location: String,
    pub owner_id: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub operating_hours: Option<OperatingHours>,
    pub booking_settings: Option<BookingSettings>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Hours for a single weekday. `open`/`close` fall back to the system
/// defaults when unset; only an explicit `closed: true` closes the day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DayHours {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<String>,
    #[serde(default)]
    pub closed: bool,
}

/// Per-weekday schedule, keyed by lowercase day name ("monday".."sunday").
/// Days absent from the map are treated as open with default hours.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatingHours {
    #[serde(flatten)]
    pub days: HashMap<String, DayHours>,
}

impl OperatingHours {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let hours: OperatingHours = serde_json::from_str(s)?;
        hours.validate()?;
        Ok(hours)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (day, schedule) in &self.days {
            parse_weekday(day)?;
            if let Some(open) = &schedule.open {
                parse_label(open)?;
            }
            if let Some(close) = &schedule.close {
                parse_label(close)?;
            }
        }
        Ok(())
    }
}

/// A salon's stored booking configuration. Every field is optional:
/// missing fields take the system default at resolve time, so a salon
/// may customize a single knob without restating the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_advance_booking_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_advance_booking_days: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_same_day_booking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_hours: Option<i64>,
}

impl BookingSettings {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let settings: BookingSettings = serde_json::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(interval) = self.slot_interval {
            anyhow::ensure!(interval > 0, "slot_interval must be positive");
        }
        if let Some(days) = self.max_advance_booking_days {
            anyhow::ensure!(days >= 0, "max_advance_booking_days must not be negative");
        }
        if let Some(hours) = self.min_advance_booking_hours {
            anyhow::ensure!(hours >= 0, "min_advance_booking_hours must not be negative");
        }
        if let Some(hours) = self.cancellation_hours {
            anyhow::ensure!(hours >= 0, "cancellation_hours must not be negative");
        }
        Ok(())
    }
}

fn parse_weekday(s: &str) -> anyhow::Result<()> {
    match s {
        "monday" | "tuesday" | "wednesday" | "thursday" | "friday" | "saturday" | "sunday" => {
            Ok(())
        }
        _ => Err(anyhow::anyhow!("invalid weekday: {s}")),
    }
}

fn parse_label(s: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|_| anyhow::anyhow!("invalid time: {s}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operating_hours() {
        let json = r#"{"monday":{"open":"10:00","close":"19:00"},"sunday":{"closed":true}}"#;
        let hours = OperatingHours::from_json(json).unwrap();
        assert_eq!(hours.days.len(), 2);
        assert_eq!(hours.days["monday"].open.as_deref(), Some("10:00"));
        assert!(hours.days["sunday"].closed);
    }

    #[test]
    fn test_parse_invalid_weekday() {
        let json = r#"{"funday":{"open":"10:00"}}"#;
        assert!(OperatingHours::from_json(json).is_err());
    }

    #[test]
    fn test_parse_invalid_time() {
        let json = r#"{"monday":{"open":"25:00"}}"#;
        assert!(OperatingHours::from_json(json).is_err());
    }

    #[test]
    fn test_parse_partial_booking_settings() {
        let settings = BookingSettings::from_json(r#"{"slot_interval":15}"#).unwrap();
        assert_eq!(settings.slot_interval, Some(15));
        assert!(settings.cancellation_hours.is_none());
    }

    #[test]
    fn test_reject_zero_interval() {
        assert!(BookingSettings::from_json(r#"{"slot_interval":0}"#).is_err());
    }
}
