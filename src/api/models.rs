//! REST request/response types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::engine::{ErrorKind, GridError, RawNumber};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCellRequest {
    #[serde(default)]
    pub row: RawNumber,
    #[serde(default)]
    pub col: RawNumber,
    #[serde(default, rename = "newValue")]
    pub new_value: RawNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddColumnRequest {
    #[serde(default, rename = "newWidth")]
    pub new_width: RawNumber,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRowRequest {
    #[serde(default, rename = "newHeight")]
    pub new_height: RawNumber,
    #[serde(default)]
    pub prices: Vec<RawNumber>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetCellResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SetCellResponse {
    pub fn ok() -> Self {
        Self { success: true, message: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub heights: usize,
    pub widths: usize,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Failure body shape. The cell endpoint carries a `success` flag, the
/// append endpoints only a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Flagged,
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub envelope: Envelope,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>, envelope: Envelope) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into(), envelope }
    }

    pub fn from_grid(err: GridError, envelope: Envelope) -> Self {
        let status = match err.kind() {
            ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        };
        Self { status, message: err.to_string(), envelope }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.envelope {
            Envelope::Flagged => (
                self.status,
                Json(SetCellResponse { success: false, message: Some(self.message) }),
            )
                .into_response(),
            Envelope::Plain => {
                (self.status, Json(ErrorResponse { message: self.message })).into_response()
            }
        }
    }
}
