//! API response types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Standard API response wrapper.
///
/// Errors use the same envelope with `success = false`; see
/// [`plaza_common::AppError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub code: u16,
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub fn ok(data: T) -> Self {
        Self::with_message(data, "success")
    }

    /// Create a success response with a custom message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            success: true,
            message: "success".to_string(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope() {
        let value = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(value["code"], 200);
        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "success");
        assert_eq!(value["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn test_empty_envelope_has_null_data() {
        let value = serde_json::to_value(ApiResponse::empty()).unwrap();
        assert!(value["data"].is_null());
    }
}
