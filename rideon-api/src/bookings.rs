use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rideon_core::booking::{Booking, BookingRequest, BookingStatus, PassengerDetail};

use crate::error::AppError;
use crate::middleware::auth::{auth_middleware, require_admin, Claims};
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateBookingRequest {
    pub route: Uuid,
    pub vehicle: Uuid,
    pub travel_date: DateTime<Utc>,
    #[serde(default)]
    pub selected_seats: Vec<String>,
    pub number_of_passengers: u32,
    #[serde(default)]
    pub passenger_details: Vec<PassengerDetail>,
    pub total_amount: i64,
    #[serde(default)]
    pub offer_code: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingResponse {
    pub booking: Booking,
    pub confirmation_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListResponse {
    pub count: usize,
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: BookingStatus,
    #[serde(default)]
    pub admin_notes: Option<String>,
}

// ============================================================================
// Routes
// ============================================================================

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking).get(list_bookings))
        .route("/my-bookings", get(my_bookings))
        .route("/{id}", get(get_booking))
        .route("/{id}/cancel", patch(cancel_booking))
        .route("/{id}/status", patch(update_booking_status))
        .route_layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/bookings
/// Create a booking at `pending` and notify the admin channel.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    // Malformed or incomplete bodies fail fast with the field-level reason
    let Json(req) = payload.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

    let request = BookingRequest {
        route_id: req.route,
        vehicle_id: req.vehicle,
        travel_date: req.travel_date,
        selected_seats: req.selected_seats,
        number_of_passengers: req.number_of_passengers,
        passenger_details: req.passenger_details,
        total_amount: req.total_amount,
        offer_code: req.offer_code,
    };

    let booking = state.engine.create(claims.sub, request).await?;
    let confirmation_number = booking.reference.clone();

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResponse {
            booking,
            confirmation_number,
        }),
    ))
}

/// GET /api/bookings/my-bookings
async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<BookingListResponse>, AppError> {
    let bookings = state.engine.list_for_user(claims.sub).await?;
    Ok(Json(BookingListResponse {
        count: bookings.len(),
        bookings,
    }))
}

/// GET /api/bookings?status=
/// Admin listing across all users, optionally filtered by status.
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    require_admin(&claims)?;

    let bookings = state.engine.list(query.status).await?;
    Ok(Json(BookingListResponse {
        count: bookings.len(),
        bookings,
    }))
}

/// GET /api/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.engine.get_authorized(id, claims.sub, claims.is_admin()).await?;
    Ok(Json(booking))
}

/// PATCH /api/bookings/{id}/cancel
/// Owner cancellation, allowed from `pending` or `approved` only.
async fn cancel_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.engine.cancel(id, claims.sub).await?;
    Ok(Json(booking))
}

/// PATCH /api/bookings/{id}/status
/// Admin transition through the lifecycle table.
async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Booking>, AppError> {
    require_admin(&claims)?;
    let Json(req) = payload.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;

    let booking = state.engine.transition(id, req.status, req.admin_notes).await?;
    Ok(Json(booking))
}
