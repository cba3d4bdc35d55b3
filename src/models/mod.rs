pub mod actor;
pub mod appointment;
pub mod notification;
pub mod salon;
pub mod service;

pub use actor::Actor;
pub use appointment::{Appointment, AppointmentStatus};
pub use notification::{Notification, NotificationKind};
pub use salon::{BookingSettings, DayHours, OperatingHours, Salon};
pub use service::Service;
