use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use rideon_core::repository::VehicleRepository;
use rideon_core::vehicle::{InventoryError, Seat, Vehicle};

/// In-memory vehicle store and seat inventory. Holding the write lock
/// across the check-and-flip makes reservation atomic per process: two
/// racing requests for the same seat serialize here, and the loser sees
/// the flag already cleared.
pub struct MemoryVehicleRepository {
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
}

impl MemoryVehicleRepository {
    pub fn new() -> Self {
        Self {
            vehicles: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVehicleRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleRepository for MemoryVehicleRepository {
    async fn insert(&self, vehicle: Vehicle) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.vehicles.write().await.insert(vehicle.id, vehicle);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Vehicle>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.vehicles.read().await.get(&id).cloned())
    }

    async fn reserve_seats(&self, vehicle_id: Uuid, labels: &[String]) -> Result<Vec<Seat>, InventoryError> {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles.get_mut(&vehicle_id).ok_or(InventoryError::VehicleNotFound(vehicle_id))?;

        if !vehicle.has_seat_map() {
            return Ok(Vec::new());
        }

        // All-or-nothing: verify every label before flipping any flag
        for label in labels {
            match vehicle.seat(label) {
                Some(seat) if seat.is_available => {}
                _ => return Err(InventoryError::SeatUnavailable(label.clone())),
            }
        }

        for seat in vehicle.seats.iter_mut() {
            if labels.contains(&seat.label) {
                seat.is_available = false;
            }
        }
        debug!("Reserved {} seat(s) on vehicle {}", labels.len(), vehicle_id);

        Ok(vehicle.seats.clone())
    }

    async fn release_seats(&self, vehicle_id: Uuid, labels: &[String]) -> Result<Vec<Seat>, InventoryError> {
        let mut vehicles = self.vehicles.write().await;
        let vehicle = vehicles.get_mut(&vehicle_id).ok_or(InventoryError::VehicleNotFound(vehicle_id))?;

        if !vehicle.has_seat_map() {
            return Ok(Vec::new());
        }

        // Tolerant of stale labels: anything unmatched is ignored
        for seat in vehicle.seats.iter_mut() {
            if labels.contains(&seat.label) {
                seat.is_available = true;
            }
        }
        debug!("Released seat(s) on vehicle {}", vehicle_id);

        Ok(vehicle.seats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn bus(capacity: u32) -> Vehicle {
        Vehicle::new_bus("AC Seater Bus", "TN04GH3456", "Ashok Leyland", "Viking", capacity, false)
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_reserve_and_release_round_trip() {
        let repo = MemoryVehicleRepository::new();
        let vehicle = bus(10);
        let id = vehicle.id;
        repo.insert(vehicle).await.unwrap();

        let seats = repo.reserve_seats(id, &labels(&["S1", "S2"])).await.unwrap();
        assert!(!seats.iter().find(|s| s.label == "S1").unwrap().is_available);
        assert!(!seats.iter().find(|s| s.label == "S2").unwrap().is_available);
        assert_eq!(seats.iter().filter(|s| s.is_available).count(), 8);

        let seats = repo.release_seats(id, &labels(&["S1", "S2"])).await.unwrap();
        assert_eq!(seats.iter().filter(|s| s.is_available).count(), 10);
    }

    #[tokio::test]
    async fn test_reserve_is_all_or_nothing() {
        let repo = MemoryVehicleRepository::new();
        let vehicle = bus(4);
        let id = vehicle.id;
        repo.insert(vehicle).await.unwrap();

        repo.reserve_seats(id, &labels(&["S2"])).await.unwrap();

        // S1 is free but S2 is taken: nothing must flip
        let err = repo.reserve_seats(id, &labels(&["S1", "S2"])).await.unwrap_err();
        assert!(matches!(err, InventoryError::SeatUnavailable(ref l) if l == "S2"));

        let vehicle = repo.get(id).await.unwrap().unwrap();
        assert!(vehicle.seat("S1").unwrap().is_available);
    }

    #[tokio::test]
    async fn test_unknown_label_rejected_on_reserve_ignored_on_release() {
        let repo = MemoryVehicleRepository::new();
        let vehicle = bus(2);
        let id = vehicle.id;
        repo.insert(vehicle).await.unwrap();

        let err = repo.reserve_seats(id, &labels(&["S9"])).await.unwrap_err();
        assert!(matches!(err, InventoryError::SeatUnavailable(_)));

        // Releasing a label that never existed is harmless
        let seats = repo.release_seats(id, &labels(&["S9"])).await.unwrap();
        assert_eq!(seats.iter().filter(|s| s.is_available).count(), 2);
    }

    #[tokio::test]
    async fn test_release_is_idempotent() {
        let repo = MemoryVehicleRepository::new();
        let vehicle = bus(2);
        let id = vehicle.id;
        repo.insert(vehicle).await.unwrap();

        repo.reserve_seats(id, &labels(&["S1"])).await.unwrap();
        repo.release_seats(id, &labels(&["S1"])).await.unwrap();
        let seats = repo.release_seats(id, &labels(&["S1"])).await.unwrap();
        assert!(seats.iter().find(|s| s.label == "S1").unwrap().is_available);
    }

    #[tokio::test]
    async fn test_no_op_for_vehicles_without_seat_map() {
        let repo = MemoryVehicleRepository::new();
        let car = Vehicle::new_car("Luxury Sedan", "DL01AB1234", "Toyota", "Camry", 4);
        let id = car.id;
        repo.insert(car).await.unwrap();

        assert!(repo.reserve_seats(id, &labels(&["S1"])).await.unwrap().is_empty());
        assert!(repo.release_seats(id, &labels(&["S1"])).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reserve_single_winner() {
        let repo = Arc::new(MemoryVehicleRepository::new());
        let vehicle = bus(1);
        let id = vehicle.id;
        repo.insert(vehicle).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.reserve_seats(id, &["S1".to_string()]).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);

        let vehicle = repo.get(id).await.unwrap().unwrap();
        assert_eq!(vehicle.available_seat_count(), 0);
    }
}
