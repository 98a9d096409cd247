use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub departure_time: String,
    pub arrival_time: String,
}

/// Static fare/schedule metadata referenced by bookings. Owned by route
/// administration; read-only to the booking core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: Uuid,
    pub source: String,
    pub destination: String,
    pub distance_km: u32,
    pub duration: String,
    pub vehicle_id: Uuid,
    /// Price per seat in whole currency units.
    pub price: i64,
    pub schedule: Schedule,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Route {
    pub fn display_name(&self) -> String {
        format!("{} → {}", self.source, self.destination)
    }
}
