use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::{info, warn};

use super::models::{
    AddColumnRequest, AddRowRequest, ApiError, Envelope, HealthResponse, SetCellRequest,
    SetCellResponse,
};
use super::server::AppState;
use crate::engine::Grid;

fn body<T>(payload: Result<Json<T>, JsonRejection>, envelope: Envelope) -> Result<T, ApiError> {
    match payload {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => {
            warn!(error = %rejection, "Rejecting malformed request body");
            Err(ApiError::bad_request(rejection.body_text(), envelope))
        }
    }
}

pub async fn get_prices(State(state): State<AppState>) -> Json<Grid> {
    Json(state.store.read())
}

pub async fn set_cell(
    State(state): State<AppState>,
    payload: Result<Json<SetCellRequest>, JsonRejection>,
) -> Result<Json<SetCellResponse>, ApiError> {
    let req = body(payload, Envelope::Flagged)?;
    state
        .store
        .set_cell(&req.row, &req.col, &req.new_value)
        .map_err(|e| ApiError::from_grid(e, Envelope::Flagged))?;

    Ok(Json(SetCellResponse::ok()))
}

pub async fn add_column(
    State(state): State<AppState>,
    payload: Result<Json<AddColumnRequest>, JsonRejection>,
) -> Result<Json<Grid>, ApiError> {
    let req = body(payload, Envelope::Plain)?;
    let grid = state
        .store
        .append_column(&req.new_width)
        .map_err(|e| ApiError::from_grid(e, Envelope::Plain))?;
    info!(widths = grid.widths.len(), "Column added");
    Ok(Json(grid))
}

pub async fn add_row(
    State(state): State<AppState>,
    payload: Result<Json<AddRowRequest>, JsonRejection>,
) -> Result<Json<Grid>, ApiError> {
    let req = body(payload, Envelope::Plain)?;
    let grid = state
        .store
        .append_row(&req.new_height, &req.prices)
        .map_err(|e| ApiError::from_grid(e, Envelope::Plain))?;
    info!(heights = grid.heights.len(), "Row added");
    Ok(Json(grid))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let (heights, widths) = state.store.dimensions();
    Json(HealthResponse {
        status: "ok".to_string(),
        heights,
        widths,
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
