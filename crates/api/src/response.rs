use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::AppError;

/// Success side of the shared envelope:
/// `{ "success": true, "data": …, "message"?: … }`.
pub enum ApiResponse<T> {
    Ok(T),
    Created(T),
    Message(String),
}

pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let (status, data, message) = match self {
            ApiResponse::Ok(data) => (StatusCode::OK, Some(data), None),
            ApiResponse::Created(data) => (StatusCode::CREATED, Some(data), None),
            ApiResponse::Message(message) => (StatusCode::OK, None, Some(message)),
        };

        (
            status,
            Json(Envelope {
                success: true,
                data,
                message,
            }),
        )
            .into_response()
    }
}
