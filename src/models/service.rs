use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A bookable service. Belongs to exactly one salon; `duration_minutes`
/// drives how many slot blocks an appointment occupies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub salon_id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub discount: i64,
    pub duration_minutes: i64,
    pub created_at: NaiveDateTime,
}

impl Service {
    /// Price after discount, frozen onto the appointment at booking time.
    pub fn final_price(&self) -> i64 {
        self.price - self.discount
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("service name is required".to_string());
        }
        if self.price <= 0 {
            return Err("service price must be positive".to_string());
        }
        if self.duration_minutes <= 0 {
            return Err("service duration must be positive".to_string());
        }
        if self.discount < 0 || self.discount > self.price {
            return Err("discount must be between 0 and the service price".to_string());
        }
        Ok(())
    }
}
