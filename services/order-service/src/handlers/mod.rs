pub mod create_order;
pub mod list_orders;

use axum::{http::StatusCode, Json};
use ordering::OrderError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

impl From<OrderError> for ErrorResponse {
    fn from(err: OrderError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

/// Any orchestration failure is a 500; the message names the cause
pub fn order_error(err: OrderError) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(err.into()))
}
