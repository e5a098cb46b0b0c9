use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use aperture_auth::{evaluate, AllowedRoles, AuthzError, RoleEquivalences, TokenVerifier};

use crate::app::errors;
use crate::context::PrincipalContext;
use crate::directory::StaffDirectory;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: Arc<dyn TokenVerifier>,
}

/// Bearer-token authentication: establishes the principal, nothing more.
///
/// Role checks happen later in [`role_gate`], against the stored record.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    let claims = state
        .verifier
        .verify(token, Utc::now())
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.role.clone()));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

/// State for one role gate: the declaration plus what it needs to decide.
///
/// Built once per protected route group and injected via
/// `axum::middleware::from_fn_with_state(gate, role_gate)`.
#[derive(Clone)]
pub struct RoleGate {
    directory: Arc<dyn StaffDirectory>,
    equivalences: RoleEquivalences,
    allowed: Arc<AllowedRoles>,
}

impl RoleGate {
    pub fn new(
        directory: Arc<dyn StaffDirectory>,
        equivalences: RoleEquivalences,
        allowed: impl Into<AllowedRoles>,
    ) -> Self {
        Self {
            directory,
            equivalences,
            allowed: Arc::new(allowed.into()),
        }
    }
}

/// The role check itself.
///
/// The stored role is reloaded from the directory on every request — the
/// token's role claim may be stale, and a deleted account must stop passing
/// immediately. A missing record is 401, a role mismatch is 403 with the
/// full derivation logged (never returned).
pub async fn role_gate(
    State(gate): State<RoleGate>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(principal) = req.extensions().get::<PrincipalContext>().cloned() else {
        return Err(errors::authz_error_to_response(&AuthzError::Unauthenticated));
    };

    let record = gate
        .directory
        .find_by_id(principal.staff_id())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "staff directory lookup failed");
            errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "directory_error",
                "staff lookup failed",
            )
        })?;

    let Some(record) = record else {
        return Err(errors::authz_error_to_response(&AuthzError::Unauthenticated));
    };

    let decision = evaluate(&gate.equivalences, &gate.allowed, record.role.as_str());
    match decision.require() {
        Ok(()) => {
            tracing::debug!(
                path = %req.uri().path(),
                staff_id = %principal.staff_id(),
                matched = ?decision.matched,
                "role gate passed"
            );
            req.extensions_mut().insert(record);
            Ok(next.run(req).await)
        }
        Err(err) => {
            tracing::warn!(
                path = %req.uri().path(),
                staff_id = %principal.staff_id(),
                token_role = %principal.token_role(),
                raw_allowed = ?decision.raw_allowed,
                normalized_allowed = ?decision.normalized_allowed,
                expanded_allowed = ?decision.expanded_allowed,
                user_equivalents = ?decision.user_equivalents,
                "role gate denied"
            );
            Err(errors::authz_error_to_response(&err))
        }
    }
}
