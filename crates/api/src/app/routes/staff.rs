use axum::{extract::Extension, response::IntoResponse, Json};

use crate::directory::StaffRecord;

/// GET /profile - the caller's own record, as freshly loaded by the gate.
pub async fn profile(Extension(record): Extension<StaffRecord>) -> impl IntoResponse {
    Json(record)
}
