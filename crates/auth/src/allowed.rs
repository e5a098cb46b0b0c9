use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::Role;

/// A route's declared allowed-roles declaration, before normalization.
///
/// Route declarations have accumulated every shape over the years: a single
/// string, a flat list, lists nested inside lists, and objects carrying a
/// `role` field. All of them are decoded into this variant at the boundary
/// and flattened from there; nothing downstream dispatches on raw JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedRoles {
    /// No roles declared. Always denies.
    Empty,
    /// A single raw role token.
    One(String),
    /// An ordered list of nested declarations.
    Many(Vec<AllowedRoles>),
    /// An object form carrying the declaration under a `role` key.
    Tagged(Box<AllowedRoles>),
}

impl AllowedRoles {
    /// Convenience constructor for the common flat-list declaration.
    pub fn any<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Many(roles.into_iter().map(|r| Self::One(r.into())).collect())
    }

    /// Decode an arbitrary JSON value into a declaration.
    ///
    /// This never fails: unrecognized shapes degrade to a token that will
    /// match nothing rather than crashing the check.
    /// - `null` contributes no tokens
    /// - strings and other scalars are single tokens
    /// - arrays are decoded element-wise
    /// - objects with a `role` key decode that key's value
    /// - objects without one are stringified into a single (unmatchable) token
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Empty,
            Value::String(s) => Self::One(s.clone()),
            Value::Array(items) => Self::Many(items.iter().map(Self::from_value).collect()),
            Value::Object(map) => match map.get("role") {
                Some(inner) => Self::Tagged(Box::new(Self::from_value(inner))),
                None => Self::One(value.to_string()),
            },
            other => Self::One(other.to_string()),
        }
    }

    /// Flatten into the ordered raw token sequence (pre-lowercasing, not
    /// deduplicated).
    pub fn flatten(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Empty => {}
            Self::One(token) => out.push(token.clone()),
            Self::Many(items) => {
                for item in items {
                    item.flatten_into(out);
                }
            }
            Self::Tagged(inner) => inner.flatten_into(out),
        }
    }

    /// Flatten, trim, lowercase, and deduplicate. Blank tokens are dropped.
    pub fn normalized_set(&self) -> BTreeSet<Role> {
        self.flatten()
            .iter()
            .filter_map(|token| Role::normalized(token))
            .collect()
    }
}

impl Default for AllowedRoles {
    fn default() -> Self {
        Self::Empty
    }
}

impl From<&str> for AllowedRoles {
    fn from(role: &str) -> Self {
        Self::One(role.to_string())
    }
}

impl<S: Into<String>> From<Vec<S>> for AllowedRoles {
    fn from(roles: Vec<S>) -> Self {
        Self::any(roles)
    }
}

impl<'de> Deserialize<'de> for AllowedRoles {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn role(s: &str) -> Role {
        Role::normalized(s).unwrap()
    }

    #[test]
    fn flat_list_flattens_in_order() {
        let declared = AllowedRoles::any(["chairman", "admin", "manager"]);
        assert_eq!(declared.flatten(), vec!["chairman", "admin", "manager"]);
    }

    #[test]
    fn nested_arrays_are_flattened() {
        let declared = AllowedRoles::from_value(&json!([["chairman"], [["admin", "manager"]]]));
        assert_eq!(declared.flatten(), vec!["chairman", "admin", "manager"]);
    }

    #[test]
    fn object_with_role_key_unwraps() {
        let declared = AllowedRoles::from_value(&json!([{ "role": "admin" }]));
        assert_eq!(declared.normalized_set(), BTreeSet::from([role("admin")]));
    }

    #[test]
    fn object_without_role_key_becomes_unmatchable_token() {
        let declared = AllowedRoles::from_value(&json!({ "rolle": "admin" }));
        let tokens = declared.flatten();
        assert_eq!(tokens.len(), 1);
        // Still a token (nothing is silently dropped), but it can never
        // equal a stored role.
        assert!(tokens[0].contains("rolle"));
    }

    #[test]
    fn null_and_empty_shapes_yield_no_tokens() {
        assert!(AllowedRoles::from_value(&json!(null)).flatten().is_empty());
        assert!(AllowedRoles::from_value(&json!([])).flatten().is_empty());
        assert!(AllowedRoles::from_value(&json!([[], [[]]])).flatten().is_empty());
    }

    #[test]
    fn scalars_are_stringified() {
        assert_eq!(AllowedRoles::from_value(&json!(7)).flatten(), vec!["7"]);
        assert_eq!(AllowedRoles::from_value(&json!(true)).flatten(), vec!["true"]);
    }

    #[test]
    fn normalized_set_trims_lowercases_and_dedupes() {
        let declared = AllowedRoles::any([" Admin ", "ADMIN", "admin", "  "]);
        assert_eq!(declared.normalized_set(), BTreeSet::from([role("admin")]));
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(tokens in proptest::collection::vec(".{0,12}", 0..8)) {
            let declared = AllowedRoles::any(tokens);
            let once = declared.normalized_set();
            let again = AllowedRoles::any(once.iter().map(|r| r.as_str().to_string()))
                .normalized_set();
            prop_assert_eq!(once, again);
        }

        #[test]
        fn case_and_whitespace_do_not_matter(token in "[a-zA-Z_]{1,12}") {
            let plain = AllowedRoles::from(token.as_str()).normalized_set();
            let shouty = AllowedRoles::One(format!("  {} ", token.to_uppercase())).normalized_set();
            prop_assert_eq!(plain, shouty);
        }
    }
}
