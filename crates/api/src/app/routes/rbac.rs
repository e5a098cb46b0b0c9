//! RBAC audit endpoints for transparent authorization debugging.
//!
//! These answer "why was this request denied?" without anyone having to
//! replay the request: the alias table, per-role expansions, and a dry-run
//! of the decision against any declaration shape.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use aperture_auth::{evaluate, roles::CANONICAL_ROLES, AllowedRoles, Role, RoleEquivalences};

use crate::app::errors;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/:name/equivalents", get(role_equivalents))
        .route("/explain", post(explain_decision))
}

/// GET /rbac/roles - canonical roles plus the legacy alias table.
pub async fn list_roles(
    Extension(equivalences): Extension<RoleEquivalences>,
) -> axum::response::Response {
    let aliases: Vec<_> = equivalences
        .aliases()
        .map(|(alias, canonical)| json!({ "alias": alias, "canonical": canonical }))
        .collect();

    (
        StatusCode::OK,
        Json(json!({ "roles": CANONICAL_ROLES, "aliases": aliases })),
    )
        .into_response()
}

/// GET /rbac/roles/:name/equivalents - every spelling a role answers to.
pub async fn role_equivalents(
    Extension(equivalences): Extension<RoleEquivalences>,
    Path(name): Path<String>,
) -> axum::response::Response {
    let Some(role) = Role::normalized(&name) else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_role", "role name is blank");
    };

    let equivalents = equivalences.expand(&role);
    (
        StatusCode::OK,
        Json(json!({ "role": role, "equivalents": equivalents })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    /// Any declaration shape a route could carry; decoded defensively.
    #[serde(default)]
    pub allowed: AllowedRoles,
    /// The stored role to test against it.
    pub role: String,
}

/// POST /rbac/explain - dry-run a gate decision and return the derivation.
pub async fn explain_decision(
    Extension(equivalences): Extension<RoleEquivalences>,
    Json(body): Json<ExplainRequest>,
) -> axum::response::Response {
    let decision = evaluate(&equivalences, &body.allowed, &body.role);
    (StatusCode::OK, Json(decision)).into_response()
}
