use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Booking status in the approval lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Transition table for admin-driven status changes. Same-state updates
    /// are handled separately as notes-only edits and never reach this check.
    pub fn can_transition_to(self, target: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, target),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Completed) | (Approved, Cancelled) | (Rejected, Approved)
        )
    }

    /// Seats go back to the pool when a booking enters one of these states.
    pub fn releases_seats(self) -> bool {
        matches!(self, BookingStatus::Rejected | BookingStatus::Cancelled)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    Netbanking,
    Wallet,
    Cash,
    None,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerDetail {
    pub name: String,
    pub age: u8,
    pub gender: Gender,
}

/// A validated booking request, ready for the lifecycle engine.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub travel_date: DateTime<Utc>,
    pub selected_seats: Vec<String>,
    pub number_of_passengers: u32,
    pub passenger_details: Vec<PassengerDetail>,
    pub total_amount: i64,
    pub offer_code: Option<String>,
}

/// The central entity: a reservation linking a user, route, vehicle and
/// travel date with payment and approval tracking. Never deleted, only
/// moved through statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Human-readable confirmation number, unique and immutable.
    pub reference: String,
    pub user_id: Uuid,
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub booking_date: DateTime<Utc>,
    pub travel_date: DateTime<Utc>,
    pub selected_seats: Vec<String>,
    pub number_of_passengers: u32,
    pub passenger_details: Vec<PassengerDetail>,
    pub total_amount: i64,
    pub discount_amount: i64,
    pub final_amount: i64,
    pub applied_offer: Option<Uuid>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub admin_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: Uuid, request: &BookingRequest, discount_amount: i64, applied_offer: Option<Uuid>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference: generate_reference(now),
            user_id,
            route_id: request.route_id,
            vehicle_id: request.vehicle_id,
            booking_date: now,
            travel_date: request.travel_date,
            selected_seats: request.selected_seats.clone(),
            number_of_passengers: request.number_of_passengers,
            passenger_details: request.passenger_details.clone(),
            total_amount: request.total_amount,
            discount_amount,
            final_amount: (request.total_amount - discount_amount).max(0),
            applied_offer,
            status: BookingStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: PaymentMethod::None,
            admin_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

const REFERENCE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Confirmation numbers look like `BKM3X1A9Q7ZK`: a "BK" prefix, the
/// creation instant in base 36 millis, and a 4-character random suffix to
/// keep same-millisecond bookings distinct.
pub fn generate_reference(now: DateTime<Utc>) -> String {
    let mut millis = now.timestamp_millis().max(0) as u64;
    let mut encoded = Vec::new();
    if millis == 0 {
        encoded.push(b'0');
    }
    while millis > 0 {
        encoded.push(REFERENCE_ALPHABET[(millis % 36) as usize]);
        millis /= 36;
    }
    encoded.reverse();

    let mut rng = rand::thread_rng();
    let mut reference = String::with_capacity(2 + encoded.len() + 4);
    reference.push_str("BK");
    for b in encoded {
        reference.push(b as char);
    }
    for _ in 0..4 {
        reference.push(REFERENCE_ALPHABET[rng.gen_range(0..REFERENCE_ALPHABET.len())] as char);
    }
    reference
}
