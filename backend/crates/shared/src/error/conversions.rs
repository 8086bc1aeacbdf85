//! Error conversions
//!
//! The JSON rejection body used by every HTTP surface.

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;
        use axum::http::StatusCode;

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Partners and the web client both read `status` as the success flag
        let body = serde_json::json!({
            "status": false,
            "message": self.message(),
            "code": self.code(),
        });

        (status, Json(body)).into_response()
    }
}
