use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::booking::{Booking, BookingRequest, BookingStatus};
use crate::notifier::BookingNotifier;
use crate::repository::{BookingRepository, OfferRepository, RouteRepository, VehicleRepository};
use crate::vehicle::InventoryError;

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Booking not found")]
    BookingNotFound,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Vehicle not found")]
    VehicleNotFound,

    #[error("Not authorized to access this booking")]
    Forbidden,

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition { from: BookingStatus, to: BookingStatus },

    #[error("Cannot cancel a booking in the {0} state")]
    NotCancellable(BookingStatus),

    #[error("Seat {0} is not available")]
    SeatUnavailable(String),

    #[error("{0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<InventoryError> for BookingError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::VehicleNotFound(_) => BookingError::VehicleNotFound,
            InventoryError::SeatUnavailable(label) => BookingError::SeatUnavailable(label),
        }
    }
}

fn storage(err: Box<dyn std::error::Error + Send + Sync>) -> BookingError {
    BookingError::Storage(err.to_string())
}

/// Orchestrates the booking lifecycle: creation, admin-gated status
/// transitions and owner cancellation. Seat reservation, offer redemption
/// and realtime fan-out all run through here; handlers never touch the
/// inventory directly.
pub struct BookingEngine {
    bookings: Arc<dyn BookingRepository>,
    vehicles: Arc<dyn VehicleRepository>,
    offers: Arc<dyn OfferRepository>,
    routes: Arc<dyn RouteRepository>,
    notifier: Arc<dyn BookingNotifier>,
}

impl BookingEngine {
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        vehicles: Arc<dyn VehicleRepository>,
        offers: Arc<dyn OfferRepository>,
        routes: Arc<dyn RouteRepository>,
        notifier: Arc<dyn BookingNotifier>,
    ) -> Self {
        Self {
            bookings,
            vehicles,
            offers,
            routes,
            notifier,
        }
    }

    /// Create a booking at `pending`.
    ///
    /// Seats are claimed atomically BEFORE anything is persisted, so two
    /// concurrent requests for the last seat resolve to exactly one
    /// success. Offer application is best-effort: a bad code costs the
    /// discount, never the booking.
    pub async fn create(&self, user_id: Uuid, request: BookingRequest) -> Result<Booking, BookingError> {
        validate_request(&request)?;

        self.routes
            .get(request.route_id)
            .await
            .map_err(storage)?
            .ok_or(BookingError::RouteNotFound)?;
        let vehicle = self
            .vehicles
            .get(request.vehicle_id)
            .await
            .map_err(storage)?
            .ok_or(BookingError::VehicleNotFound)?;

        let wants_seats = vehicle.has_seat_map() && !request.selected_seats.is_empty();
        let reserved = if wants_seats {
            Some(self.vehicles.reserve_seats(vehicle.id, &request.selected_seats).await?)
        } else {
            None
        };

        let mut discount_amount = 0;
        let mut applied_offer = None;
        if let Some(code) = request.offer_code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            match self.offers.apply(code, request.total_amount, vehicle.vehicle_type, Utc::now()).await {
                Ok(applied) => {
                    discount_amount = applied.discount_amount;
                    applied_offer = Some(applied.offer_id);
                }
                Err(err) => {
                    // Bad promo codes never block a valid booking
                    warn!("Offer {} not applied: {}", code, err);
                }
            }
        }

        let booking = Booking::new(user_id, &request, discount_amount, applied_offer);
        if let Err(err) = self.bookings.insert(booking.clone()).await {
            // Reservation and persistence are one logical unit: give the
            // seats back if the write never landed.
            if wants_seats {
                let _ = self.vehicles.release_seats(vehicle.id, &request.selected_seats).await;
            }
            return Err(storage(err));
        }

        if let Some(seats) = reserved {
            self.notifier.seat_availability_updated(vehicle.id, &seats);
        }
        self.notifier.booking_created(&booking);
        info!("Booking {} created for user {}", booking.reference, user_id);

        Ok(booking)
    }

    /// Admin-gated status transition.
    ///
    /// A same-state target is a notes-only update with no side effects.
    /// Entering `rejected` or `cancelled` releases any held seats before
    /// the owner is notified.
    pub async fn transition(
        &self,
        booking_id: Uuid,
        target: BookingStatus,
        notes: Option<String>,
    ) -> Result<Booking, BookingError> {
        let mut booking = self
            .bookings
            .get(booking_id)
            .await
            .map_err(storage)?
            .ok_or(BookingError::BookingNotFound)?;

        if booking.status == target {
            if let Some(notes) = notes {
                booking.admin_notes = notes;
                booking.updated_at = Utc::now();
                self.bookings.update(booking.clone()).await.map_err(storage)?;
            }
            return Ok(booking);
        }

        if !booking.status.can_transition_to(target) {
            return Err(BookingError::InvalidTransition {
                from: booking.status,
                to: target,
            });
        }

        let from = booking.status;
        booking.status = target;
        if let Some(notes) = notes {
            booking.admin_notes = notes;
        }
        booking.updated_at = Utc::now();
        self.bookings.update(booking.clone()).await.map_err(storage)?;

        if target.releases_seats() {
            self.release_booking_seats(&booking).await;
        }

        self.notifier.booking_status_updated(booking.user_id, &booking);
        info!("Booking {} moved {} -> {}", booking.reference, from, target);

        Ok(booking)
    }

    /// Owner-initiated cancellation, allowed only from `pending` or
    /// `approved`. Emits the same status event as an admin transition so
    /// dashboards observe cancellations without polling.
    pub async fn cancel(&self, booking_id: Uuid, requesting_user: Uuid) -> Result<Booking, BookingError> {
        let mut booking = self
            .bookings
            .get(booking_id)
            .await
            .map_err(storage)?
            .ok_or(BookingError::BookingNotFound)?;

        if booking.user_id != requesting_user {
            return Err(BookingError::Forbidden);
        }
        if !matches!(booking.status, BookingStatus::Pending | BookingStatus::Approved) {
            return Err(BookingError::NotCancellable(booking.status));
        }

        booking.status = BookingStatus::Cancelled;
        booking.updated_at = Utc::now();
        self.bookings.update(booking.clone()).await.map_err(storage)?;

        self.release_booking_seats(&booking).await;
        self.notifier.booking_status_updated(booking.user_id, &booking);
        info!("Booking {} cancelled by owner", booking.reference);

        Ok(booking)
    }

    /// Owner-or-admin read.
    pub async fn get_authorized(&self, booking_id: Uuid, user_id: Uuid, is_admin: bool) -> Result<Booking, BookingError> {
        let booking = self
            .bookings
            .get(booking_id)
            .await
            .map_err(storage)?
            .ok_or(BookingError::BookingNotFound)?;

        if !is_admin && booking.user_id != user_id {
            return Err(BookingError::Forbidden);
        }
        Ok(booking)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, BookingError> {
        self.bookings.list_for_user(user_id).await.map_err(storage)
    }

    pub async fn list(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>, BookingError> {
        self.bookings.list(status).await.map_err(storage)
    }

    /// Give a booking's seats back to the pool and broadcast the new map.
    /// Release is tolerant: a missing vehicle is logged, not fatal, so a
    /// rejection always lands even if the fleet record went away.
    async fn release_booking_seats(&self, booking: &Booking) {
        if booking.selected_seats.is_empty() {
            return;
        }
        match self.vehicles.release_seats(booking.vehicle_id, &booking.selected_seats).await {
            Ok(seats) => {
                if !seats.is_empty() {
                    self.notifier.seat_availability_updated(booking.vehicle_id, &seats);
                }
            }
            Err(err) => {
                warn!("Could not release seats for booking {}: {}", booking.reference, err);
            }
        }
    }
}

fn validate_request(request: &BookingRequest) -> Result<(), BookingError> {
    if request.number_of_passengers == 0 {
        return Err(BookingError::Validation("At least one passenger is required".to_string()));
    }
    if request.total_amount < 0 {
        return Err(BookingError::Validation("Amount cannot be negative".to_string()));
    }
    if !request.selected_seats.is_empty() && request.selected_seats.len() != request.number_of_passengers as usize {
        return Err(BookingError::Validation(
            "Selected seats must match the number of passengers".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_validation() {
        let mut request = BookingRequest {
            route_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            travel_date: Utc::now(),
            selected_seats: vec!["S1".to_string()],
            number_of_passengers: 1,
            passenger_details: vec![],
            total_amount: 500,
            offer_code: None,
        };
        assert!(validate_request(&request).is_ok());

        request.number_of_passengers = 0;
        assert!(matches!(validate_request(&request), Err(BookingError::Validation(_))));

        request.number_of_passengers = 2;
        assert!(matches!(validate_request(&request), Err(BookingError::Validation(_))));

        request.selected_seats.push("S2".to_string());
        assert!(validate_request(&request).is_ok());

        request.total_amount = -1;
        assert!(matches!(validate_request(&request), Err(BookingError::Validation(_))));
    }
}
