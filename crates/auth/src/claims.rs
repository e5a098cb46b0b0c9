use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Role, StaffId};

/// JWT claims model (transport-agnostic).
///
/// The minimal claim set Aperture expects once a token has been decoded and
/// signature-checked by the transport layer. Note that `role` is the role
/// *at issue time*; gates reload the stored role on every check and never
/// authorize from this field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject / staff identifier.
    pub sub: StaffId,

    /// Role granted when the token was issued (informational only).
    pub role: Role,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token is malformed or has an invalid signature")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,
}

/// Decode and verify a raw bearer token into claims.
///
/// Implementations own the signature scheme; claim-window validation should
/// go through [`validate_claims`] so the rules stay in one place.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError>;
}

/// Deterministically validate the claim time window.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
