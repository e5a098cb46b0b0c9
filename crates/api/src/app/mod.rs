//! HTTP application wiring (axum router + gates).
//!
//! Layout:
//! - `routes/`: HTTP handlers (one file per area)
//! - `errors.rs`: consistent JSON error responses
//!
//! Gate placement: bearer authentication wraps everything protected; each
//! route group then carries its own role gate with its own declaration.

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use aperture_auth::{roles::CANONICAL_ROLES, AllowedRoles, RoleEquivalences, TokenVerifier};

use crate::directory::StaffDirectory;
use crate::middleware::{self, AuthState, RoleGate};

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(
    verifier: Arc<dyn TokenVerifier>,
    directory: Arc<dyn StaffDirectory>,
    equivalences: RoleEquivalences,
) -> Router {
    let auth_state = AuthState { verifier };

    let rbac_gate = RoleGate::new(
        directory.clone(),
        equivalences.clone(),
        AllowedRoles::any(["chairman", "admin"]),
    );
    let staff_gate = RoleGate::new(
        directory,
        equivalences.clone(),
        AllowedRoles::any(CANONICAL_ROLES.iter().copied()),
    );

    let rbac = routes::rbac::router().route_layer(axum::middleware::from_fn_with_state(
        rbac_gate,
        middleware::role_gate,
    ));

    let staff = Router::new()
        .route("/profile", get(routes::staff::profile))
        .route_layer(axum::middleware::from_fn_with_state(
            staff_gate,
            middleware::role_gate,
        ));

    // Protected routes: require auth, then the per-group role gate.
    let protected = Router::new()
        .nest("/rbac", rbac)
        .merge(staff)
        .layer(Extension(equivalences))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
