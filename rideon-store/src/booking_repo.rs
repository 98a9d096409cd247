use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use rideon_core::booking::{Booking, BookingStatus};
use rideon_core::repository::BookingRepository;

/// In-memory booking store. The single write lock is the serialization
/// point for all booking mutations in this process.
pub struct MemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self {
            bookings: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryBookingRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn insert(&self, booking: Booking) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(format!("Booking {} already exists", booking.id).into());
        }
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn update(&self, booking: Booking) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings = self.bookings.write().await;
        if !bookings.contains_key(&booking.id) {
            return Err(format!("Booking {} does not exist", booking.id).into());
        }
        bookings.insert(booking.id, booking);
        Ok(())
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let bookings = self.bookings.read().await;
        let mut result: Vec<Booking> = bookings.values().filter(|b| b.user_id == user_id).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn list(&self, status: Option<BookingStatus>) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let bookings = self.bookings.read().await;
        let mut result: Vec<Booking> = bookings
            .values()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rideon_core::booking::BookingRequest;

    fn booking_for(user_id: Uuid) -> Booking {
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
        Booking::new(user_id, &request, 0, None)
    }

    #[tokio::test]
    async fn test_insert_get_update() {
        let repo = MemoryBookingRepository::new();
        let user = Uuid::new_v4();
        let booking = booking_for(user);
        let id = booking.id;

        repo.insert(booking.clone()).await.unwrap();
        assert!(repo.insert(booking.clone()).await.is_err());

        let mut stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Pending);

        stored.status = BookingStatus::Approved;
        repo.update(stored).await.unwrap();
        assert_eq!(repo.get(id).await.unwrap().unwrap().status, BookingStatus::Approved);
    }

    #[tokio::test]
    async fn test_list_filters() {
        let repo = MemoryBookingRepository::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let mut approved = booking_for(user);
        approved.status = BookingStatus::Approved;
        repo.insert(approved).await.unwrap();
        repo.insert(booking_for(user)).await.unwrap();
        repo.insert(booking_for(other)).await.unwrap();

        assert_eq!(repo.list_for_user(user).await.unwrap().len(), 2);
        assert_eq!(repo.list(None).await.unwrap().len(), 3);
        assert_eq!(repo.list(Some(BookingStatus::Approved)).await.unwrap().len(), 1);
        assert_eq!(repo.list(Some(BookingStatus::Rejected)).await.unwrap().len(), 0);
    }
}
