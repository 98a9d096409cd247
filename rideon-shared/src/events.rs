use uuid::Uuid;

/// Payload pushed to a booking's owner (and any watcher of the booking's
/// channel) when an admin or the owner moves the booking to a new status.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusUpdatedEvent {
    pub booking_id: Uuid,
    pub status: String,
    pub booking: serde_json::Value,
}

/// Payload pushed to the admin channel when a customer creates a booking.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBookingEvent {
    pub booking_id: Uuid,
    pub booking: serde_json::Value,
}

/// Payload broadcast to every connected client after a vehicle's seat map
/// changes. Carries the full seat sequence, not a delta.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SeatAvailabilityUpdatedEvent {
    pub vehicle_id: Uuid,
    pub seats: serde_json::Value,
}
