use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Bus,
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VehicleType::Car => f.write_str("car"),
            VehicleType::Bus => f.write_str("bus"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SeatCategory {
    Sleeper,
    Seater,
    Normal,
}

/// One addressable seat slot. The availability flag is the single source
/// of truth for whether the seat can be reserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub label: String,
    pub is_available: bool,
    pub category: SeatCategory,
}

/// Fleet vehicle: capacity plus, for buses, the seat map. Seats are
/// generated once at construction and never regenerated; only their
/// availability flags change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub registration: String,
    pub vehicle_type: VehicleType,
    pub brand: String,
    pub model: String,
    pub capacity: u32,
    pub seats: Vec<Seat>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    /// Cars have no per-seat inventory; capacity alone bounds them.
    pub fn new_car(name: &str, registration: &str, brand: &str, model: &str, capacity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            registration: registration.to_string(),
            vehicle_type: VehicleType::Car,
            brand: brand.to_string(),
            model: model.to_string(),
            capacity,
            seats: Vec::new(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Buses get one seat per unit of capacity, labelled S1..Sn.
    pub fn new_bus(name: &str, registration: &str, brand: &str, model: &str, capacity: u32, sleeper: bool) -> Self {
        let category = if sleeper { SeatCategory::Sleeper } else { SeatCategory::Seater };
        let seats = (1..=capacity)
            .map(|n| Seat {
                label: format!("S{}", n),
                is_available: true,
                category,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            registration: registration.to_string(),
            vehicle_type: VehicleType::Bus,
            brand: brand.to_string(),
            model: model.to_string(),
            capacity,
            seats,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// Whether this vehicle tracks per-seat availability.
    pub fn has_seat_map(&self) -> bool {
        !self.seats.is_empty()
    }

    pub fn available_seat_count(&self) -> u32 {
        if self.has_seat_map() {
            self.seats.iter().filter(|s| s.is_available).count() as u32
        } else {
            self.capacity
        }
    }

    pub fn seat(&self, label: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.label == label)
    }
}

/// Errors from the conflict-sensitive seat inventory operations.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Vehicle not found: {0}")]
    VehicleNotFound(Uuid),

    #[error("Seat {0} is not available")]
    SeatUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_seat_generation() {
        let bus = Vehicle::new_bus("Volvo AC Sleeper", "KA03EF9012", "Volvo", "Multi-Axle", 40, true);
        assert_eq!(bus.seats.len(), 40);
        assert_eq!(bus.seats[0].label, "S1");
        assert_eq!(bus.seats[39].label, "S40");
        assert!(bus.seats.iter().all(|s| s.is_available));
        assert!(bus.seats.iter().all(|s| s.category == SeatCategory::Sleeper));
        assert!(bus.has_seat_map());
        assert_eq!(bus.available_seat_count(), 40);
    }

    #[test]
    fn test_car_has_no_seat_map() {
        let car = Vehicle::new_car("Luxury Sedan", "DL01AB1234", "Toyota", "Camry", 4);
        assert!(!car.has_seat_map());
        assert_eq!(car.available_seat_count(), 4);
        assert!(car.seat("S1").is_none());
    }

    #[test]
    fn test_available_count_follows_flags() {
        let mut bus = Vehicle::new_bus("AC Seater", "TN04GH3456", "Ashok Leyland", "Viking", 10, false);
        bus.seats[0].is_available = false;
        bus.seats[3].is_available = false;
        assert_eq!(bus.available_seat_count(), 8);
    }
}
