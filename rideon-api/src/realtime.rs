use std::collections::HashSet;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use rideon_core::booking::Booking;
use rideon_core::notifier::BookingNotifier;
use rideon_core::vehicle::Seat;
use rideon_shared::events::{BookingStatusUpdatedEvent, NewBookingEvent, SeatAvailabilityUpdatedEvent};

use crate::middleware::auth::{decode_claims, Claims};
use crate::state::AppState;

// ============================================================================
// Rooms and wire messages
// ============================================================================

/// A named subscription group. Each connected client holds a set of rooms;
/// an envelope with no room is delivered to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    User(Uuid),
    Admins,
    Booking(Uuid),
}

#[derive(Debug, Clone)]
pub struct Envelope {
    pub room: Option<Room>,
    pub event: ServerEvent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    BookingStatusUpdated(BookingStatusUpdatedEvent),
    NewBooking(NewBookingEvent),
    SeatAvailabilityUpdated(SeatAvailabilityUpdatedEvent),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    Join { user_id: Uuid },
    JoinAdmin,
    #[serde(rename_all = "camelCase")]
    JoinBooking { booking_id: Uuid },
    #[serde(rename_all = "camelCase")]
    LeaveBooking { booking_id: Uuid },
}

// ============================================================================
// Hub
// ============================================================================

/// Fan-out point for realtime events. Fire-and-forget, at-most-once: an
/// envelope sent while nobody listens (or past a lagging receiver's
/// buffer) is gone, and clients reconcile with a fetch.
#[derive(Clone)]
pub struct RealtimeHub {
    tx: broadcast::Sender<Envelope>,
}

impl RealtimeHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    fn publish(&self, room: Option<Room>, event: ServerEvent) {
        let _ = self.tx.send(Envelope { room, event });
    }
}

impl BookingNotifier for RealtimeHub {
    fn booking_created(&self, booking: &Booking) {
        let event = NewBookingEvent {
            booking_id: booking.id,
            booking: serde_json::to_value(booking).unwrap_or(serde_json::Value::Null),
        };
        self.publish(Some(Room::Admins), ServerEvent::NewBooking(event));
    }

    fn booking_status_updated(&self, user_id: Uuid, booking: &Booking) {
        let event = BookingStatusUpdatedEvent {
            booking_id: booking.id,
            status: booking.status.to_string(),
            booking: serde_json::to_value(booking).unwrap_or(serde_json::Value::Null),
        };
        // The owner's channel plus the booking's own channel, for clients
        // sitting on the confirmation page.
        self.publish(Some(Room::User(user_id)), ServerEvent::BookingStatusUpdated(event.clone()));
        self.publish(Some(Room::Booking(booking.id)), ServerEvent::BookingStatusUpdated(event));
    }

    fn seat_availability_updated(&self, vehicle_id: Uuid, seats: &[Seat]) {
        let event = SeatAvailabilityUpdatedEvent {
            vehicle_id,
            seats: serde_json::to_value(seats).unwrap_or(serde_json::Value::Null),
        };
        self.publish(None, ServerEvent::SeatAvailabilityUpdated(event));
    }
}

fn should_deliver(joined: &HashSet<Room>, envelope: &Envelope) -> bool {
    match &envelope.room {
        None => true,
        Some(room) => joined.contains(room),
    }
}

// ============================================================================
// WebSocket endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
}

/// GET /api/ws?token=...
/// Authenticated upgrade; room membership is negotiated over the socket.
pub async fn ws_handler(State(state): State<AppState>, Query(query): Query<WsQuery>, ws: WebSocketUpgrade) -> Response {
    let claims = match decode_claims(&query.token, &state.auth.secret) {
        Ok(claims) => claims,
        Err(_) => return (StatusCode::UNAUTHORIZED, "Invalid token").into_response(),
    };

    info!("Realtime client connected: {}", claims.sub);
    ws.on_upgrade(move |socket| handle_socket(socket, claims, state))
}

async fn handle_socket(socket: WebSocket, claims: Claims, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.hub.subscribe();
    let mut joined: HashSet<Room> = HashSet::new();

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(text.as_str()) {
                            Ok(msg) => handle_client_message(msg, &claims, &state, &mut joined).await,
                            Err(err) => debug!("Ignoring malformed client message: {}", err),
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
            event = events.recv() => {
                match event {
                    Ok(envelope) => {
                        if !should_deliver(&joined, &envelope) {
                            continue;
                        }
                        let payload = match serde_json::to_string(&envelope.event) {
                            Ok(payload) => payload,
                            Err(err) => {
                                warn!("Could not serialize realtime event: {}", err);
                                continue;
                            }
                        };
                        if sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Dropped events are the contract; the client refetches
                        warn!("Realtime client {} lagged, {} event(s) dropped", claims.sub, missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    info!("Realtime client disconnected: {}", claims.sub);
}

async fn handle_client_message(msg: ClientMessage, claims: &Claims, state: &AppState, joined: &mut HashSet<Room>) {
    match msg {
        ClientMessage::Join { user_id } => {
            if user_id == claims.sub {
                joined.insert(Room::User(user_id));
                debug!("User {} joined their room", user_id);
            } else {
                warn!("User {} refused access to room of user {}", claims.sub, user_id);
            }
        }
        ClientMessage::JoinAdmin => {
            if claims.is_admin() {
                joined.insert(Room::Admins);
                debug!("Admin {} joined the admin room", claims.sub);
            } else {
                warn!("User {} refused access to the admin room", claims.sub);
            }
        }
        ClientMessage::JoinBooking { booking_id } => {
            // Booking channels carry private status updates: owner or admin only
            let allowed = match state.bookings.get(booking_id).await {
                Ok(Some(booking)) => claims.is_admin() || booking.user_id == claims.sub,
                Ok(None) => false,
                Err(err) => {
                    warn!("Booking lookup failed during join: {}", err);
                    false
                }
            };
            if allowed {
                joined.insert(Room::Booking(booking_id));
                debug!("User {} watching booking {}", claims.sub, booking_id);
            } else {
                warn!("User {} refused access to booking room {}", claims.sub, booking_id);
            }
        }
        ClientMessage::LeaveBooking { booking_id } => {
            joined.remove(&Room::Booking(booking_id));
            debug!("User {} left booking room {}", claims.sub, booking_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rideon_core::booking::BookingRequest;

    fn booking() -> Booking {
        let request = BookingRequest {
            route_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            travel_date: Utc::now(),
            selected_seats: vec![],
            number_of_passengers: 1,
            passenger_details: vec![],
            total_amount: 500,
            offer_code: None,
        };
        Booking::new(Uuid::new_v4(), &request, 0, None)
    }

    #[tokio::test]
    async fn test_new_booking_goes_to_admin_room() {
        let hub = RealtimeHub::new(16);
        let mut rx = hub.subscribe();

        let booking = booking();
        hub.booking_created(&booking);

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.room, Some(Room::Admins));
        assert!(matches!(envelope.event, ServerEvent::NewBooking(_)));
    }

    #[tokio::test]
    async fn test_status_update_goes_to_user_and_booking_rooms() {
        let hub = RealtimeHub::new(16);
        let mut rx = hub.subscribe();

        let booking = booking();
        hub.booking_status_updated(booking.user_id, &booking);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.room, Some(Room::User(booking.user_id)));
        assert_eq!(second.room, Some(Room::Booking(booking.id)));
    }

    #[tokio::test]
    async fn test_seat_updates_are_global() {
        let hub = RealtimeHub::new(16);
        let mut rx = hub.subscribe();

        hub.seat_availability_updated(Uuid::new_v4(), &[]);

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.room, None);
    }

    #[test]
    fn test_room_filtering() {
        let user = Uuid::new_v4();
        let mut joined = HashSet::new();
        joined.insert(Room::User(user));

        let for_me = Envelope {
            room: Some(Room::User(user)),
            event: ServerEvent::SeatAvailabilityUpdated(SeatAvailabilityUpdatedEvent {
                vehicle_id: Uuid::new_v4(),
                seats: serde_json::Value::Null,
            }),
        };
        let for_admins = Envelope {
            room: Some(Room::Admins),
            event: for_me.event.clone(),
        };
        let global = Envelope {
            room: None,
            event: for_me.event.clone(),
        };

        assert!(should_deliver(&joined, &for_me));
        assert!(!should_deliver(&joined, &for_admins));
        assert!(should_deliver(&joined, &global));
    }

    #[test]
    fn test_client_message_wire_format() {
        let msg: ClientMessage = serde_json::from_str(r#"{"action":"join-admin"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::JoinAdmin));

        let id = Uuid::new_v4();
        let raw = format!(r#"{{"action":"join-booking","bookingId":"{}"}}"#, id);
        let msg: ClientMessage = serde_json::from_str(&raw).unwrap();
        assert!(matches!(msg, ClientMessage::JoinBooking { booking_id } if booking_id == id));
    }

    #[test]
    fn test_server_event_wire_format() {
        let event = ServerEvent::NewBooking(NewBookingEvent {
            booking_id: Uuid::new_v4(),
            booking: serde_json::Value::Null,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"new-booking""#));
        assert!(json.contains(r#""bookingId""#));
    }
}
