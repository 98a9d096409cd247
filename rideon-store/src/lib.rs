pub mod app_config;
pub mod booking_repo;
pub mod offer_repo;
pub mod route_repo;
pub mod seed;
pub mod vehicle_repo;

pub use booking_repo::MemoryBookingRepository;
pub use offer_repo::MemoryOfferRepository;
pub use route_repo::MemoryRouteRepository;
pub use vehicle_repo::MemoryVehicleRepository;
