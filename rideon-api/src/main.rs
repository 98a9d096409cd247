use std::net::SocketAddr;
use std::sync::Arc;

use rideon_api::{app, realtime::RealtimeHub, state::{AppState, AuthConfig}};
use rideon_core::lifecycle::BookingEngine;
use rideon_core::repository::{BookingRepository, OfferRepository, RouteRepository, VehicleRepository};
use rideon_store::{MemoryBookingRepository, MemoryOfferRepository, MemoryRouteRepository, MemoryVehicleRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rideon_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = rideon_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Rideon API on port {}", config.server.port);

    let bookings: Arc<dyn BookingRepository> = Arc::new(MemoryBookingRepository::new());
    let vehicles: Arc<dyn VehicleRepository> = Arc::new(MemoryVehicleRepository::new());
    let offers: Arc<dyn OfferRepository> = Arc::new(MemoryOfferRepository::new());
    let routes: Arc<dyn RouteRepository> = Arc::new(MemoryRouteRepository::new());

    if config.demo.seed {
        rideon_store::seed::load_demo_data(vehicles.as_ref(), routes.as_ref(), offers.as_ref())
            .await
            .expect("Failed to load demo data");

        // A ready-to-use admin token so the instance is drivable immediately
        match rideon_api::middleware::auth::issue_token(
            uuid::Uuid::new_v4(),
            "Demo Admin",
            "admin",
            &config.auth.jwt_secret,
            config.auth.jwt_expiration_seconds,
        ) {
            Ok(token) => tracing::info!("Demo admin token: {}", token),
            Err(err) => tracing::warn!("Could not mint demo admin token: {}", err),
        }
    }

    let hub = RealtimeHub::new(config.realtime.channel_capacity);
    let engine = Arc::new(BookingEngine::new(
        bookings.clone(),
        vehicles.clone(),
        offers.clone(),
        routes.clone(),
        Arc::new(hub.clone()),
    ));

    let app_state = AppState {
        engine,
        bookings,
        vehicles,
        offers,
        routes,
        hub,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
