use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use rideon_core::offer::{AppliedOffer, Offer, OfferApplyError};
use rideon_core::repository::OfferRepository;
use rideon_core::vehicle::VehicleType;

/// In-memory offer store. `apply` validates and increments the usage
/// count under one write lock, so a near-exhausted code admits exactly as
/// many redemptions as its limit allows, regardless of interleaving.
pub struct MemoryOfferRepository {
    offers: RwLock<HashMap<Uuid, Offer>>,
}

impl MemoryOfferRepository {
    pub fn new() -> Self {
        Self {
            offers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryOfferRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfferRepository for MemoryOfferRepository {
    async fn insert(&self, mut offer: Offer) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        offer.code = offer.code.trim().to_uppercase();
        self.offers.write().await.insert(offer.id, offer);
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        let code = code.trim().to_uppercase();
        Ok(self.offers.read().await.values().find(|o| o.code == code).cloned())
    }

    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<Offer>, Box<dyn std::error::Error + Send + Sync>> {
        let offers = self.offers.read().await;
        let mut result: Vec<Offer> = offers.values().filter(|o| o.is_currently_active(now)).cloned().collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn apply(
        &self,
        code: &str,
        booking_amount: i64,
        vehicle_type: VehicleType,
        now: DateTime<Utc>,
    ) -> Result<AppliedOffer, OfferApplyError> {
        let code = code.trim().to_uppercase();
        let mut offers = self.offers.write().await;
        let offer = offers
            .values_mut()
            .find(|o| o.code == code)
            .ok_or(OfferApplyError::NotFound)?;

        offer.validate(booking_amount, vehicle_type, now)?;
        let discount_amount = offer.discount_for(booking_amount);
        offer.used_count += 1;
        debug!("Offer {} redeemed, used {} time(s)", offer.code, offer.used_count);

        Ok(AppliedOffer {
            offer_id: offer.id,
            code: offer.code.clone(),
            discount_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rideon_core::offer::{ApplicableOn, DiscountKind, OfferRejection};
    use std::sync::Arc;

    fn offer(code: &str, usage_limit: Option<u64>) -> Offer {
        let now = Utc::now();
        Offer {
            id: Uuid::new_v4(),
            code: code.to_string(),
            title: "Test".to_string(),
            description: "Test offer".to_string(),
            discount_kind: DiscountKind::Flat,
            discount_value: 100,
            max_discount: None,
            min_booking_amount: 0,
            valid_from: now - Duration::days(1),
            valid_till: now + Duration::days(30),
            usage_limit,
            used_count: 0,
            applicable_on: ApplicableOn::All,
            is_active: true,
            terms: vec![],
            created_at: now,
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let repo = MemoryOfferRepository::new();
        repo.insert(offer("save100", None)).await.unwrap();

        assert!(repo.find_by_code("SAVE100").await.unwrap().is_some());
        assert!(repo.find_by_code("save100").await.unwrap().is_some());
        assert!(repo.find_by_code("NOPE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apply_increments_used_count_once() {
        let repo = MemoryOfferRepository::new();
        repo.insert(offer("SAVE100", None)).await.unwrap();

        let applied = repo.apply("SAVE100", 1000, VehicleType::Bus, Utc::now()).await.unwrap();
        assert_eq!(applied.discount_amount, 100);

        let stored = repo.find_by_code("SAVE100").await.unwrap().unwrap();
        assert_eq!(stored.used_count, 1);

        // A bare validation query must not consume a redemption
        stored.validate(1000, VehicleType::Bus, Utc::now()).unwrap();
        assert_eq!(repo.find_by_code("SAVE100").await.unwrap().unwrap().used_count, 1);
    }

    #[tokio::test]
    async fn test_rejected_apply_leaves_count_untouched() {
        let repo = MemoryOfferRepository::new();
        let mut o = offer("SAVE100", None);
        o.min_booking_amount = 800;
        repo.insert(o).await.unwrap();

        let err = repo.apply("SAVE100", 500, VehicleType::Bus, Utc::now()).await.unwrap_err();
        assert!(matches!(err, OfferApplyError::Rejected(OfferRejection::BelowMinimumAmount(800))));
        assert_eq!(repo.find_by_code("SAVE100").await.unwrap().unwrap().used_count, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_usage_limit_holds_under_concurrency() {
        let repo = Arc::new(MemoryOfferRepository::new());
        repo.insert(offer("ONCE", Some(1))).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.apply("ONCE", 1000, VehicleType::Bus, Utc::now()).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(repo.find_by_code("ONCE").await.unwrap().unwrap().used_count, 1);
    }
}
