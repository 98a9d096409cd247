use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use rideon_core::vehicle::{Seat, VehicleType};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatMapResponse {
    pub vehicle_id: Uuid,
    pub vehicle_type: VehicleType,
    pub capacity: u32,
    pub available: u32,
    pub seats: Vec<Seat>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/{id}/seats", get(get_seat_map))
}

/// GET /api/vehicles/{id}/seats
/// Public seat map snapshot. Clients that missed a realtime seat event
/// reconcile through this endpoint.
async fn get_seat_map(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SeatMapResponse>, AppError> {
    let vehicle = state
        .vehicles
        .get(id)
        .await
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError("Vehicle not found".to_string()))?;

    Ok(Json(SeatMapResponse {
        vehicle_id: vehicle.id,
        vehicle_type: vehicle.vehicle_type,
        capacity: vehicle.capacity,
        available: vehicle.available_seat_count(),
        seats: vehicle.seats,
    }))
}
