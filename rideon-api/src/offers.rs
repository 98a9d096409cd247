use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use rideon_core::offer::Offer;
use rideon_core::vehicle::VehicleType;

use crate::error::AppError;
use crate::middleware::auth::auth_middleware;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ValidateOfferRequest {
    pub code: String,
    pub booking_amount: i64,
    pub vehicle_type: VehicleType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOfferResponse {
    pub code: String,
    pub title: String,
    pub discount_amount: i64,
    pub final_amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferListResponse {
    pub count: usize,
    pub offers: Vec<Offer>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/validate",
            post(validate_offer).layer(axum::middleware::from_fn_with_state(state, auth_middleware)),
        )
        .route("/", get(list_active_offers))
        .route("/{code}", get(get_offer_by_code))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/offers/validate
/// Price a code against a prospective booking without redeeming it.
async fn validate_offer(
    State(state): State<AppState>,
    payload: Result<Json<ValidateOfferRequest>, JsonRejection>,
) -> Result<Json<ValidateOfferResponse>, AppError> {
    let Json(req) = payload.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

    if req.code.trim().is_empty() {
        return Err(AppError::ValidationError("Offer code is required".to_string()));
    }

    let offer = state
        .offers
        .find_by_code(&req.code)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Invalid offer code".to_string()))?;

    offer
        .validate(req.booking_amount, req.vehicle_type, Utc::now())
        .map_err(|rejection| AppError::ValidationError(rejection.to_string()))?;

    let discount_amount = offer.discount_for(req.booking_amount);

    Ok(Json(ValidateOfferResponse {
        code: offer.code,
        title: offer.title,
        discount_amount,
        final_amount: req.booking_amount - discount_amount,
    }))
}

/// GET /api/offers
/// Offers currently inside their validity window.
async fn list_active_offers(State(state): State<AppState>) -> Result<Json<OfferListResponse>, AppError> {
    let offers = state
        .offers
        .list_active(Utc::now())
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok(Json(OfferListResponse {
        count: offers.len(),
        offers,
    }))
}

/// GET /api/offers/{code}
async fn get_offer_by_code(State(state): State<AppState>, Path(code): Path<String>) -> Result<Json<Offer>, AppError> {
    let offer = state
        .offers
        .find_by_code(&code)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Offer not found".to_string()))?;

    Ok(Json(offer))
}
