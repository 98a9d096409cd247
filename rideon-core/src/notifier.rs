use uuid::Uuid;

use crate::booking::Booking;
use crate::vehicle::Seat;

/// Outbound event seam between the lifecycle engine and whatever realtime
/// transport is wired in. Delivery is best-effort and fire-and-forget;
/// implementations must never block or fail the calling mutation.
pub trait BookingNotifier: Send + Sync {
    /// A customer created a booking; addressed to the admin channel.
    fn booking_created(&self, booking: &Booking);

    /// A booking changed status; addressed to the owner's channel and the
    /// booking's own channel.
    fn booking_status_updated(&self, user_id: Uuid, booking: &Booking);

    /// A vehicle's seat map changed; addressed to every connected client.
    fn seat_availability_updated(&self, vehicle_id: Uuid, seats: &[Seat]);
}

/// Recorded copy of every event a test run emitted.
#[derive(Debug, Clone)]
pub enum EmittedEvent {
    BookingCreated { booking_id: Uuid },
    BookingStatusUpdated { user_id: Uuid, booking_id: Uuid, status: crate::booking::BookingStatus },
    SeatAvailabilityUpdated { vehicle_id: Uuid, available: u32 },
}

/// Test double that records emitted events for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    events: std::sync::Mutex<Vec<EmittedEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EmittedEvent> {
        self.events.lock().expect("notifier event log poisoned").clone()
    }
}

impl BookingNotifier for RecordingNotifier {
    fn booking_created(&self, booking: &Booking) {
        self.events
            .lock()
            .expect("notifier event log poisoned")
            .push(EmittedEvent::BookingCreated { booking_id: booking.id });
    }

    fn booking_status_updated(&self, user_id: Uuid, booking: &Booking) {
        self.events.lock().expect("notifier event log poisoned").push(EmittedEvent::BookingStatusUpdated {
            user_id,
            booking_id: booking.id,
            status: booking.status,
        });
    }

    fn seat_availability_updated(&self, vehicle_id: Uuid, seats: &[Seat]) {
        self.events.lock().expect("notifier event log poisoned").push(EmittedEvent::SeatAvailabilityUpdated {
            vehicle_id,
            available: seats.iter().filter(|s| s.is_available).count() as u32,
        });
    }
}
