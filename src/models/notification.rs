use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub message: String,
    pub appointment_id: Option<String>,
    pub salon_id: Option<String>,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    AppointmentCreated,
    AppointmentAccepted,
    AppointmentRejected,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::AppointmentCreated => "appointment-created",
            NotificationKind::AppointmentAccepted => "appointment-accepted",
            NotificationKind::AppointmentRejected => "appointment-rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "appointment-created" => Some(NotificationKind::AppointmentCreated),
            "appointment-accepted" => Some(NotificationKind::AppointmentAccepted),
            "appointment-rejected" => Some(NotificationKind::AppointmentRejected),
            _ => None,
        }
    }
}
