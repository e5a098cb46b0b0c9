use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used for access checks.
///
/// Roles are opaque lowercase strings at this layer; which roles exist and
/// which legacy names they answer to is configuration (see
/// [`crate::RoleEquivalences`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

/// Canonical roles of the business, newest naming.
pub const CANONICAL_ROLES: &[&str] = &["chairman", "admin", "manager", "staff", "client"];

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Build a role from raw input: trimmed and lowercased.
    ///
    /// Returns `None` for whitespace-only input — an empty token can never
    /// match anything and would only pollute derived sets.
    pub fn normalized(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self(Cow::Owned(token.to_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
