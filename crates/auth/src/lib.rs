//! `aperture-auth` — pure authorization boundary for the Aperture backend.
//!
//! This crate is intentionally decoupled from HTTP and storage: it owns role
//! values, the legacy-alias equivalence tables, allowed-roles normalization,
//! and the access decision itself. Fetching the staff record and mapping
//! decisions onto HTTP status codes is the API layer's job.

pub mod allowed;
pub mod authorize;
pub mod claims;
pub mod equivalence;
pub mod principal;
pub mod roles;

pub use allowed::AllowedRoles;
pub use authorize::{evaluate, AuthzError, Evaluation};
pub use claims::{validate_claims, JwtClaims, TokenValidationError, TokenVerifier};
pub use equivalence::RoleEquivalences;
pub use principal::StaffId;
pub use roles::Role;
