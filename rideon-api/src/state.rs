use std::sync::Arc;

use rideon_core::lifecycle::BookingEngine;
use rideon_core::repository::{BookingRepository, OfferRepository, RouteRepository, VehicleRepository};

use crate::realtime::RealtimeHub;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<BookingEngine>,
    pub bookings: Arc<dyn BookingRepository>,
    pub vehicles: Arc<dyn VehicleRepository>,
    pub offers: Arc<dyn OfferRepository>,
    pub routes: Arc<dyn RouteRepository>,
    pub hub: RealtimeHub,
    pub auth: AuthConfig,
}
