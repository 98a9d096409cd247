use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::vehicle::VehicleType;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountKind {
    Percentage,
    Flat,
}

/// Which vehicle types an offer code can be redeemed against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ApplicableOn {
    All,
    Car,
    Bus,
}

impl ApplicableOn {
    pub fn matches(self, vehicle_type: VehicleType) -> bool {
        match self {
            ApplicableOn::All => true,
            ApplicableOn::Car => vehicle_type == VehicleType::Car,
            ApplicableOn::Bus => vehicle_type == VehicleType::Bus,
        }
    }
}

impl std::fmt::Display for ApplicableOn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicableOn::All => f.write_str("all"),
            ApplicableOn::Car => f.write_str("car"),
            ApplicableOn::Bus => f.write_str("bus"),
        }
    }
}

/// Why an offer code was refused. The check order is fixed; the first
/// failing rule wins and is the reason reported to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OfferRejection {
    #[error("Offer is not active")]
    Inactive,

    #[error("Offer has not started yet")]
    NotStarted,

    #[error("Offer has expired")]
    Expired,

    #[error("Offer usage limit reached")]
    UsageLimitReached,

    #[error("Minimum booking amount is ₹{0}")]
    BelowMinimumAmount(i64),

    #[error("Offer applicable only on {0}")]
    NotApplicable(ApplicableOn),
}

/// A discount code with eligibility rules and a usage cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    /// Stored uppercase; lookups upcase their input.
    pub code: String,
    pub title: String,
    pub description: String,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    /// Cap for percentage discounts. None means uncapped.
    pub max_discount: Option<i64>,
    pub min_booking_amount: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_till: DateTime<Utc>,
    /// None means unlimited redemptions.
    pub usage_limit: Option<u64>,
    pub used_count: u64,
    pub applicable_on: ApplicableOn,
    pub is_active: bool,
    pub terms: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Validate the code against a booking without redeeming it.
    /// Rules run in a fixed order and the first failure is returned.
    pub fn validate(&self, booking_amount: i64, vehicle_type: VehicleType, now: DateTime<Utc>) -> Result<(), OfferRejection> {
        if !self.is_active {
            return Err(OfferRejection::Inactive);
        }
        if now < self.valid_from {
            return Err(OfferRejection::NotStarted);
        }
        if now > self.valid_till {
            return Err(OfferRejection::Expired);
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return Err(OfferRejection::UsageLimitReached);
            }
        }
        if booking_amount < self.min_booking_amount {
            return Err(OfferRejection::BelowMinimumAmount(self.min_booking_amount));
        }
        if !self.applicable_on.matches(vehicle_type) {
            return Err(OfferRejection::NotApplicable(self.applicable_on));
        }
        Ok(())
    }

    /// Discount for a given booking amount. Percentage discounts respect
    /// `max_discount`; no discount ever exceeds the amount charged.
    pub fn discount_for(&self, booking_amount: i64) -> i64 {
        let discount = match self.discount_kind {
            DiscountKind::Percentage => {
                let raw = booking_amount * self.discount_value / 100;
                match self.max_discount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            DiscountKind::Flat => self.discount_value,
        };
        discount.min(booking_amount).max(0)
    }

    /// Whether the offer shows up in the public active-offers listing.
    pub fn is_currently_active(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.valid_from <= now && self.valid_till >= now
    }
}

/// Result of an atomic validate-and-redeem against the offer store.
#[derive(Debug, Clone)]
pub struct AppliedOffer {
    pub offer_id: Uuid,
    pub code: String,
    pub discount_amount: i64,
}

/// Failure of an atomic offer application. Non-fatal to booking creation:
/// the lifecycle engine logs it and proceeds with zero discount.
#[derive(Debug, thiserror::Error)]
pub enum OfferApplyError {
    #[error("Invalid offer code")]
    NotFound,

    #[error(transparent)]
    Rejected(#[from] OfferRejection),

    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn offer(kind: DiscountKind, value: i64, max_discount: Option<i64>, min_amount: i64) -> Offer {
        let now = Utc::now();
        Offer {
            id: Uuid::new_v4(),
            code: "TESTCODE".to_string(),
            title: "Test".to_string(),
            description: "Test offer".to_string(),
            discount_kind: kind,
            discount_value: value,
            max_discount,
            min_booking_amount: min_amount,
            valid_from: now - Duration::days(1),
            valid_till: now + Duration::days(30),
            usage_limit: None,
            used_count: 0,
            applicable_on: ApplicableOn::All,
            is_active: true,
            terms: vec![],
            created_at: now,
        }
    }

    #[test]
    fn test_flat_discount_with_minimum() {
        // SAVE100: flat 100 off bookings of at least 800
        let save100 = offer(DiscountKind::Flat, 100, None, 800);

        assert!(save100.validate(1000, VehicleType::Bus, Utc::now()).is_ok());
        assert_eq!(save100.discount_for(1000), 100);

        let rejection = save100.validate(500, VehicleType::Bus, Utc::now()).unwrap_err();
        assert_eq!(rejection, OfferRejection::BelowMinimumAmount(800));
    }

    #[test]
    fn test_percentage_discount_capped() {
        // FIRST50: 50% off, capped at 500, minimum 500
        let first50 = offer(DiscountKind::Percentage, 50, Some(500), 500);

        assert!(first50.validate(1200, VehicleType::Car, Utc::now()).is_ok());
        assert_eq!(first50.discount_for(1200), 500);
        assert_eq!(1200 - first50.discount_for(1200), 700);

        // Below the cap the raw percentage applies
        assert_eq!(first50.discount_for(600), 300);
    }

    #[test]
    fn test_discount_never_exceeds_amount() {
        let generous = offer(DiscountKind::Flat, 5000, None, 0);
        assert_eq!(generous.discount_for(300), 300);
    }

    #[test]
    fn test_validation_order_first_failure_wins() {
        let mut o = offer(DiscountKind::Flat, 100, None, 800);
        o.is_active = false;
        o.valid_till = Utc::now() - Duration::days(1);

        // Inactive is checked before expiry
        assert_eq!(o.validate(1000, VehicleType::Bus, Utc::now()).unwrap_err(), OfferRejection::Inactive);
    }

    #[test]
    fn test_window_and_usage_checks() {
        let now = Utc::now();
        let mut o = offer(DiscountKind::Flat, 100, None, 0);

        o.valid_from = now + Duration::days(1);
        assert_eq!(o.validate(1000, VehicleType::Bus, now).unwrap_err(), OfferRejection::NotStarted);

        o.valid_from = now - Duration::days(2);
        o.valid_till = now - Duration::days(1);
        assert_eq!(o.validate(1000, VehicleType::Bus, now).unwrap_err(), OfferRejection::Expired);

        o.valid_till = now + Duration::days(1);
        o.usage_limit = Some(5);
        o.used_count = 5;
        assert_eq!(o.validate(1000, VehicleType::Bus, now).unwrap_err(), OfferRejection::UsageLimitReached);
    }

    #[test]
    fn test_vehicle_type_applicability() {
        let mut o = offer(DiscountKind::Flat, 100, None, 0);
        o.applicable_on = ApplicableOn::Bus;

        assert!(o.validate(1000, VehicleType::Bus, Utc::now()).is_ok());
        assert_eq!(
            o.validate(1000, VehicleType::Car, Utc::now()).unwrap_err(),
            OfferRejection::NotApplicable(ApplicableOn::Bus)
        );
    }
}
