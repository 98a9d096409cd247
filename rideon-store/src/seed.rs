use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use rideon_core::offer::{ApplicableOn, DiscountKind, Offer};
use rideon_core::repository::{OfferRepository, RouteRepository, VehicleRepository};
use rideon_core::route::{Route, Schedule};
use rideon_core::vehicle::Vehicle;

/// Load the demo fleet, routes and promotional offers so a fresh instance
/// is bookable out of the box.
pub async fn load_demo_data(
    vehicles: &dyn VehicleRepository,
    routes: &dyn RouteRepository,
    offers: &dyn OfferRepository,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fleet = vec![
        Vehicle::new_car("Luxury Sedan", "DL01AB1234", "Toyota", "Camry", 4),
        Vehicle::new_car("SUV Express", "MH02CD5678", "Mahindra", "XUV700", 7),
        Vehicle::new_bus("Volvo AC Sleeper", "KA03EF9012", "Volvo", "Multi-Axle", 40, true),
        Vehicle::new_bus("AC Seater Bus", "TN04GH3456", "Ashok Leyland", "Viking", 50, false),
        Vehicle::new_car("Premium Sedan", "DL05XY7890", "Honda", "Accord", 4),
    ];
    let fleet_ids: Vec<Uuid> = fleet.iter().map(|v| v.id).collect();
    for vehicle in fleet {
        vehicles.insert(vehicle).await?;
    }

    let demo_routes = vec![
        route("Delhi", "Mumbai", 1450, "18 hours", fleet_ids[2], 1200, "20:00", "14:00"),
        route("Delhi", "Jaipur", 280, "5 hours", fleet_ids[0], 800, "08:00", "13:00"),
        route("Mumbai", "Pune", 150, "3 hours", fleet_ids[1], 500, "10:00", "13:00"),
        route("Bangalore", "Chennai", 350, "6 hours", fleet_ids[3], 600, "06:00", "12:00"),
        route("Delhi", "Mumbai", 1450, "20 hours", fleet_ids[4], 3500, "06:00", "02:00"),
    ];
    for r in demo_routes {
        routes.insert(r).await?;
    }

    let now = Utc::now();
    let valid_till = now + Duration::days(30);

    offers
        .insert(Offer {
            id: Uuid::new_v4(),
            code: "FIRST50".to_string(),
            title: "First Booking Offer".to_string(),
            description: "Get 50% off on your first booking".to_string(),
            discount_kind: DiscountKind::Percentage,
            discount_value: 50,
            max_discount: Some(500),
            min_booking_amount: 500,
            valid_from: now,
            valid_till,
            usage_limit: None,
            used_count: 0,
            applicable_on: ApplicableOn::All,
            is_active: true,
            terms: vec!["Valid on all vehicle types".to_string()],
            created_at: now,
        })
        .await?;

    offers
        .insert(Offer {
            id: Uuid::new_v4(),
            code: "SAVE100".to_string(),
            title: "Flat ₹100 Off".to_string(),
            description: "Get flat ₹100 off on bookings above ₹800".to_string(),
            discount_kind: DiscountKind::Flat,
            discount_value: 100,
            max_discount: None,
            min_booking_amount: 800,
            valid_from: now,
            valid_till,
            usage_limit: None,
            used_count: 0,
            applicable_on: ApplicableOn::All,
            is_active: true,
            terms: vec!["Minimum booking amount ₹800".to_string()],
            created_at: now,
        })
        .await?;

    info!("Demo data loaded: 5 vehicles, 5 routes, 2 offers");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn route(
    source: &str,
    destination: &str,
    distance_km: u32,
    duration: &str,
    vehicle_id: Uuid,
    price: i64,
    departure: &str,
    arrival: &str,
) -> Route {
    Route {
        id: Uuid::new_v4(),
        source: source.to_string(),
        destination: destination.to_string(),
        distance_km,
        duration: duration.to_string(),
        vehicle_id,
        price,
        schedule: Schedule {
            departure_time: departure.to_string(),
            arrival_time: arrival.to_string(),
        },
        is_active: true,
        created_at: Utc::now(),
    }
}
