use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::booking::{Booking, BookingStatus};
use crate::offer::{AppliedOffer, Offer, OfferApplyError};
use crate::route::Route;
use crate::vehicle::{InventoryError, Seat, Vehicle, VehicleType};

/// Repository trait for booking persistence
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn insert(&self, booking: Booking) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn update(&self, booking: Booking) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Caller's bookings, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    /// All bookings, newest first, optionally filtered by status.
    async fn list(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for vehicles and their seat inventory. Reserve and
/// release are the ONLY mutation paths for seat availability; no caller
/// flips flags directly.
#[async_trait]
pub trait VehicleRepository: Send + Sync {
    async fn insert(&self, vehicle: Vehicle) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(&self, id: Uuid) -> Result<Option<Vehicle>, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomically claim every requested seat label, all-or-nothing: if any
    /// label is unknown or already taken, no flag is flipped and the
    /// offending label is reported. Returns the full updated seat
    /// sequence. No-op (empty result) for vehicles without seat maps.
    async fn reserve_seats(&self, vehicle_id: Uuid, labels: &[String]) -> Result<Vec<Seat>, InventoryError>;

    /// Flip the matched labels back to available. Idempotent; unmatched
    /// labels are silently ignored. Returns the full updated seat
    /// sequence.
    async fn release_seats(&self, vehicle_id: Uuid, labels: &[String]) -> Result<Vec<Seat>, InventoryError>;
}

/// Repository trait for offer codes
#[async_trait]
pub trait OfferRepository: Send + Sync {
    async fn insert(&self, offer: Offer) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Case-insensitive lookup by code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>>;

    /// Atomic validate-and-redeem: under a single guard, validate the code
    /// against the booking, compute the discount and increment the usage
    /// count. The increment happens exactly once per successful
    /// application and is never rolled back.
    async fn apply(
        &self,
        code: &str,
        booking_amount: i64,
        vehicle_type: VehicleType,
        now: DateTime<Utc>,
    ) -> Result<AppliedOffer, OfferApplyError>;
}

/// Repository trait for route metadata
#[async_trait]
pub trait RouteRepository: Send + Sync {
    async fn insert(&self, route: Route) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    async fn get(&self, id: Uuid) -> Result<Option<Route>, Box<dyn std::error::Error + Send + Sync>>;
}
