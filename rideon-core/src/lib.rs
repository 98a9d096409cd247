pub mod booking;
pub mod lifecycle;
pub mod notifier;
pub mod offer;
pub mod repository;
pub mod route;
pub mod vehicle;

pub use booking::{Booking, BookingRequest, BookingStatus, PassengerDetail};
pub use lifecycle::{BookingEngine, BookingError};
pub use notifier::BookingNotifier;
pub use offer::{AppliedOffer, DiscountKind, Offer, OfferRejection};
pub use route::Route;
pub use vehicle::{Seat, Vehicle, VehicleType};
