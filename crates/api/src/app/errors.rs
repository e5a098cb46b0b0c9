use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use aperture_auth::AuthzError;

pub fn authz_error_to_response(err: &AuthzError) -> axum::response::Response {
    match err {
        AuthzError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", err.to_string())
        }
        AuthzError::Forbidden { .. } => {
            json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
