//! Role-based capability gating.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A CRUD capability an action can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Create,
    Read,
    Update,
    Delete,
}

impl Capability {
    /// Returns the lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Create => "create",
            Capability::Read => "read",
            Capability::Update => "update",
            Capability::Delete => "delete",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The caller's role or roles, as supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Roles(Vec<String>);

impl Roles {
    /// Creates an empty role set (authorized only where permissions are
    /// unrestricted).
    pub fn none() -> Self {
        Self::default()
    }

    /// Iterates the role names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns `true` if no role is held.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Roles {
    fn from(role: &str) -> Self {
        Self(vec![role.to_string()])
    }
}

impl From<String> for Roles {
    fn from(role: String) -> Self {
        Self(vec![role])
    }
}

impl From<Vec<String>> for Roles {
    fn from(roles: Vec<String>) -> Self {
        Self(roles)
    }
}

impl From<&[&str]> for Roles {
    fn from(roles: &[&str]) -> Self {
        Self(roles.iter().map(|r| r.to_string()).collect())
    }
}

/// Mapping from capability to the roles authorized for it.
///
/// An empty mapping is unrestricted. Once any capability is configured, a
/// capability without an entry is denied to every role.
///
/// # Example
///
/// ```
/// use datagrid_lib::config::{Capability, Permissions, Roles};
///
/// let permissions = Permissions::new()
///     .grant(Capability::Read, ["admin", "viewer"])
///     .grant(Capability::Delete, ["admin"]);
///
/// assert!(permissions.allows(Capability::Delete, &Roles::from("admin")));
/// assert!(!permissions.allows(Capability::Delete, &Roles::from("viewer")));
/// assert!(!permissions.allows(Capability::Update, &Roles::from("admin")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<Capability, BTreeSet<String>>);

impl Permissions {
    /// Creates an unrestricted permission set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Authorizes the given roles for a capability (builder pattern).
    pub fn grant<I, S>(mut self, capability: Capability, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .entry(capability)
            .or_default()
            .extend(roles.into_iter().map(Into::into));
        self
    }

    /// Returns `true` when nothing is configured.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any of the roles holds the capability.
    pub fn allows(&self, capability: Capability, roles: &Roles) -> bool {
        if self.is_unrestricted() {
            return true;
        }
        self.0
            .get(&capability)
            .is_some_and(|allowed| roles.iter().any(|role| allowed.contains(role)))
    }
}
