//! HS256 token verification for the API layer.
//!
//! Signature handling lives here; claim-window rules stay in
//! `aperture_auth::validate_claims` so the API and any future workers agree.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use aperture_auth::{validate_claims, JwtClaims, TokenValidationError, TokenVerifier};

pub struct Hs256Verifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256Verifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Claims carry RFC 3339 timestamps, not numeric exp/iat; the time
        // window is checked by validate_claims instead.
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        Self {
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

impl TokenVerifier for Hs256Verifier {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenValidationError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &self.validation)
            .map_err(|_| TokenValidationError::Invalid)?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// Mint a signed token for the given claims (dev tooling and tests).
pub fn mint_token(claims: &JwtClaims, secret: &[u8]) -> anyhow::Result<String> {
    let token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aperture_auth::{Role, StaffId};
    use chrono::Duration;

    fn claims(now: DateTime<Utc>) -> JwtClaims {
        JwtClaims {
            sub: StaffId::new(),
            role: Role::new("admin"),
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn round_trips_valid_claims() {
        let now = Utc::now();
        let claims = claims(now);
        let token = mint_token(&claims, b"secret").unwrap();

        let verifier = Hs256Verifier::new(b"secret");
        let verified = verifier.verify(&token, now).unwrap();
        assert_eq!(verified, claims);
    }

    #[test]
    fn rejects_wrong_secret() {
        let now = Utc::now();
        let token = mint_token(&claims(now), b"secret").unwrap();

        let verifier = Hs256Verifier::new(b"other-secret");
        assert_eq!(verifier.verify(&token, now), Err(TokenValidationError::Invalid));
    }

    #[test]
    fn rejects_expired_claims() {
        let now = Utc::now();
        let mut claims = claims(now);
        claims.expires_at = now - Duration::seconds(1);
        let token = mint_token(&claims, b"secret").unwrap();

        let verifier = Hs256Verifier::new(b"secret");
        assert_eq!(verifier.verify(&token, now), Err(TokenValidationError::Expired));
    }
}
