use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use crate::Role;

/// Immutable alias/canonical equivalence tables.
///
/// The business renamed its permission tiers at some point (`company_admin`
/// became `admin`, `branch_head` became `manager`, `branch_staff` became
/// `staff`) and stored records still carry either spelling. A route declared
/// with one name must admit users stored under the other, in both directions.
///
/// Built once, injected where needed, never mutated. Cloning is cheap (the
/// tables are behind an `Arc`).
#[derive(Debug, Clone)]
pub struct RoleEquivalences {
    inner: Arc<Tables>,
}

#[derive(Debug)]
struct Tables {
    /// alias → canonical, as configured (for audit/display).
    aliases: BTreeMap<Role, Role>,
    /// Symmetric closure: every member of a pair maps to the full pair set.
    equivalents: HashMap<Role, BTreeSet<Role>>,
}

impl RoleEquivalences {
    /// Build equivalence tables from `(alias, canonical)` pairs.
    ///
    /// Both sides are normalized; pairs with a blank side are dropped. The
    /// closure is symmetric: the alias maps to `{alias, canonical}` and the
    /// canonical maps to `{canonical, alias}`. A canonical with several
    /// aliases accumulates all of them.
    pub fn new<I, A, C>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, C)>,
        A: AsRef<str>,
        C: AsRef<str>,
    {
        let mut aliases = BTreeMap::new();
        let mut equivalents: HashMap<Role, BTreeSet<Role>> = HashMap::new();

        for (alias, canonical) in pairs {
            let (Some(alias), Some(canonical)) = (
                Role::normalized(alias.as_ref()),
                Role::normalized(canonical.as_ref()),
            ) else {
                continue;
            };

            for (a, b) in [(&alias, &canonical), (&canonical, &alias)] {
                let set = equivalents.entry(a.clone()).or_default();
                set.insert(a.clone());
                set.insert(b.clone());
            }
            aliases.insert(alias, canonical);
        }

        Self {
            inner: Arc::new(Tables { aliases, equivalents }),
        }
    }

    /// The alias pairs the business actually uses.
    pub fn builtin() -> Self {
        Self::new([
            ("company_admin", "admin"),
            ("branch_head", "manager"),
            ("branch_staff", "staff"),
        ])
    }

    /// Expand one role to itself plus every equivalent spelling.
    ///
    /// Roles with no configured equivalence match only themselves.
    pub fn expand(&self, role: &Role) -> BTreeSet<Role> {
        let mut out = BTreeSet::new();
        out.insert(role.clone());
        if let Some(set) = self.inner.equivalents.get(role) {
            out.extend(set.iter().cloned());
        }
        out
    }

    /// Expand a whole set; the result is a superset of the input.
    pub fn expand_set<'a>(&self, roles: impl IntoIterator<Item = &'a Role>) -> BTreeSet<Role> {
        let mut out = BTreeSet::new();
        for role in roles {
            out.extend(self.expand(role));
        }
        out
    }

    /// Configured alias → canonical pairs (for the audit endpoints).
    pub fn aliases(&self) -> impl Iterator<Item = (&Role, &Role)> {
        self.inner.aliases.iter()
    }
}
