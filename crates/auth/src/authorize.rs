use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use crate::{AllowedRoles, Role, RoleEquivalences};

/// Authorization failure taxonomy.
///
/// The API layer maps these onto HTTP statuses (401/403). Only the role name
/// is ever echoed to the caller; the derived sets stay in the logs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    /// The staff record was gone by the time the check ran.
    #[error("unauthenticated: staff record no longer exists")]
    Unauthenticated,

    /// The stored role shares no member with the expanded allowed set.
    #[error("forbidden: role '{role}' is not permitted here")]
    Forbidden { role: String },
}

/// The full derivation behind one access decision.
///
/// Everything an operator needs to answer "why was this denied?": the raw
/// declaration, both normalized sets, both expansions, and the member that
/// matched (if any). Serialized as-is by the audit endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Tokens exactly as declared on the route, pre-normalization.
    pub raw_allowed: Vec<String>,
    /// Trimmed/lowercased/deduplicated allowed set.
    pub normalized_allowed: BTreeSet<Role>,
    /// Allowed set after legacy-alias expansion.
    pub expanded_allowed: BTreeSet<Role>,
    /// The stored role, normalized (`None` if it was blank).
    pub user_role: Option<Role>,
    /// The stored role plus every equivalent spelling.
    pub user_equivalents: BTreeSet<Role>,
    /// First member of the intersection, if any.
    pub matched: Option<Role>,
    pub granted: bool,
}

impl Evaluation {
    /// Collapse into the gate outcome.
    pub fn require(&self) -> Result<(), AuthzError> {
        if self.granted {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                role: self
                    .user_role
                    .as_ref()
                    .map(|r| r.as_str().to_string())
                    .unwrap_or_default(),
            })
        }
    }
}

/// Decide whether `stored_role` may pass a gate declared with `allowed`.
///
/// Both sides are normalized and alias-expanded identically, then
/// intersected; a non-empty intersection grants access. An empty or
/// malformed declaration converges to an empty allowed set and therefore
/// denies.
///
/// - No IO
/// - No panics
/// - Computed fresh per call; nothing is cached
pub fn evaluate(
    equivalences: &RoleEquivalences,
    allowed: &AllowedRoles,
    stored_role: &str,
) -> Evaluation {
    let raw_allowed = allowed.flatten();
    let normalized_allowed = allowed.normalized_set();
    let expanded_allowed = equivalences.expand_set(&normalized_allowed);

    let user_role = Role::normalized(stored_role);
    let user_equivalents = match &user_role {
        Some(role) => equivalences.expand(role),
        None => BTreeSet::new(),
    };

    let matched = user_equivalents
        .intersection(&expanded_allowed)
        .next()
        .cloned();

    Evaluation {
        raw_allowed,
        normalized_allowed,
        expanded_allowed,
        granted: matched.is_some(),
        user_role,
        user_equivalents,
        matched,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn eq() -> RoleEquivalences {
        RoleEquivalences::builtin()
    }

    #[test]
    fn legacy_alias_in_declaration_admits_canonical_role() {
        // branch_head expands to manager, so a manager passes.
        let allowed = AllowedRoles::any(["chairman", "company_admin", "branch_head", "branch_staff"]);
        let decision = evaluate(&eq(), &allowed, "manager");
        assert!(decision.granted);
        assert_eq!(decision.matched, Some(Role::new("manager")));
    }

    #[test]
    fn canonical_declaration_admits_legacy_stored_role() {
        let allowed = AllowedRoles::any(["chairman", "admin", "manager"]);
        let decision = evaluate(&eq(), &allowed, "company_admin");
        assert!(decision.granted);
    }

    #[test]
    fn alias_admission_holds_in_both_directions() {
        for (a, b) in [
            ("company_admin", "admin"),
            ("branch_head", "manager"),
            ("branch_staff", "staff"),
        ] {
            assert!(evaluate(&eq(), &AllowedRoles::from(a), b).granted);
            assert!(evaluate(&eq(), &AllowedRoles::from(b), a).granted);
        }
    }

    #[test]
    fn unknown_roles_match_only_themselves() {
        let allowed = AllowedRoles::from("chairman");
        assert!(evaluate(&eq(), &allowed, "chairman").granted);
        assert!(evaluate(&eq(), &allowed, " CHAIRMAN ").granted);
        assert!(!evaluate(&eq(), &allowed, "admin").granted);
        assert!(!evaluate(&eq(), &allowed, "client").granted);
    }

    #[test]
    fn empty_declaration_denies() {
        let decision = evaluate(&eq(), &AllowedRoles::any(Vec::<String>::new()), "chairman");
        assert!(!decision.granted);
        assert!(decision.expanded_allowed.is_empty());
        assert!(decision.require().is_err());
    }

    #[test]
    fn object_form_declaration_admits_after_normalization() {
        let allowed = AllowedRoles::from_value(&json!([{ "role": "admin" }]));
        assert!(evaluate(&eq(), &allowed, "Admin").granted);
    }

    #[test]
    fn malformed_declarations_deny_without_panicking() {
        for value in [json!(null), json!({}), json!([[], [[]]]), json!({ "r": 1 })] {
            let allowed = AllowedRoles::from_value(&value);
            assert!(!evaluate(&eq(), &allowed, "chairman").granted);
        }
    }

    #[test]
    fn blank_stored_role_denies() {
        let allowed = AllowedRoles::any(["chairman", "admin"]);
        let decision = evaluate(&eq(), &allowed, "   ");
        assert!(!decision.granted);
        assert!(decision.user_equivalents.is_empty());
    }

    #[test]
    fn comparison_ignores_case_and_whitespace() {
        let allowed = AllowedRoles::any([" Admin "]);
        for stored in ["admin", "ADMIN", "  aDmIn  "] {
            assert!(evaluate(&eq(), &allowed, stored).granted);
        }
    }

    #[test]
    fn forbidden_carries_normalized_role_name() {
        let decision = evaluate(&eq(), &AllowedRoles::from("chairman"), " Client ");
        let err = decision.require().unwrap_err();
        assert_eq!(err, AuthzError::Forbidden { role: "client".to_string() });
    }

    #[test]
    fn expansion_applies_to_both_sides_identically() {
        // Declared with the alias, stored as the alias: still one match,
        // and the expansion supersets include both spellings on both sides.
        let allowed = AllowedRoles::from("branch_staff");
        let decision = evaluate(&eq(), &allowed, "staff");
        assert!(decision.expanded_allowed.contains(&Role::new("staff")));
        assert!(decision.expanded_allowed.contains(&Role::new("branch_staff")));
        assert!(decision.user_equivalents.contains(&Role::new("branch_staff")));
    }
}
