use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub customer_id: String,
    pub salon_id: String,
    pub service_id: String,
    pub staff_id: Option<String>,
    pub date: NaiveDate,
    /// Slot-start label, "HH:MM".
    pub time: String,
    /// Every slot label this appointment occupies, frozen at booking time
    /// and replaced only by a reschedule.
    pub covers: Vec<String>,
    pub status: AppointmentStatus,
    /// Service price minus discount, computed once at creation.
    pub amount: i64,
    pub notes: Option<String>,
    pub accepted_at: Option<NaiveDateTime>,
    pub started_at: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub no_show_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Pending,
    Accepted,
    Rejected,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Accepted => "accepted",
            AppointmentStatus::Rejected => "rejected",
            AppointmentStatus::InProgress => "in-progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no-show",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(AppointmentStatus::Pending),
            "accepted" => Some(AppointmentStatus::Accepted),
            "rejected" => Some(AppointmentStatus::Rejected),
            "in-progress" => Some(AppointmentStatus::InProgress),
            "completed" => Some(AppointmentStatus::Completed),
            "cancelled" => Some(AppointmentStatus::Cancelled),
            "no-show" => Some(AppointmentStatus::NoShow),
            _ => None,
        }
    }

    /// Terminal appointments no longer occupy their slot-run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Rejected
                | AppointmentStatus::Completed
                | AppointmentStatus::Cancelled
                | AppointmentStatus::NoShow
        )
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Legal next statuses. Cancellation and no-show are reachable from
    /// any non-terminal state; the rest follow the linear lifecycle.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            AppointmentStatus::Cancelled | AppointmentStatus::NoShow => true,
            AppointmentStatus::Accepted | AppointmentStatus::Rejected => {
                *self == AppointmentStatus::Pending
            }
            AppointmentStatus::InProgress => *self == AppointmentStatus::Accepted,
            AppointmentStatus::Completed => *self == AppointmentStatus::InProgress,
            AppointmentStatus::Pending => false,
        }
    }
}

impl Appointment {
    /// The scheduled start as a full datetime, for cancellation-window math.
    pub fn starts_at(&self) -> Option<NaiveDateTime> {
        let time = chrono::NaiveTime::parse_from_str(&self.time, "%H:%M").ok()?;
        Some(self.date.and_time(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            AppointmentStatus::Pending,
            AppointmentStatus::Accepted,
            AppointmentStatus::Rejected,
            AppointmentStatus::InProgress,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow,
        ] {
            assert_eq!(AppointmentStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_lifecycle_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Accepted.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
    }

    #[test]
    fn test_no_skipping_states() {
        use AppointmentStatus::*;
        assert!(!Pending.can_transition_to(InProgress));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Completed));
    }

    #[test]
    fn test_cancel_and_no_show_from_any_active_state() {
        use AppointmentStatus::*;
        for status in [Pending, Accepted, InProgress] {
            assert!(status.can_transition_to(Cancelled));
            assert!(status.can_transition_to(NoShow));
        }
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        use AppointmentStatus::*;
        for status in [Rejected, Completed, Cancelled, NoShow] {
            assert!(status.is_terminal());
            assert!(!status.can_transition_to(Pending));
            assert!(!status.can_transition_to(Accepted));
            assert!(!status.can_transition_to(Cancelled));
        }
    }
}
