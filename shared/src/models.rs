//! Domain enums for the Foodgram application

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// A per-user set of recipes with (user, recipe) uniqueness
///
/// Favorites and the shopping cart behave identically; only the backing
/// table and the wording of messages differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MembershipSet {
    Favorites,
    ShoppingCart,
}

impl MembershipSet {
    /// Human-readable name used in API messages
    pub fn label(&self) -> &'static str {
        match self {
            MembershipSet::Favorites => "favorites",
            MembershipSet::ShoppingCart => "shopping cart",
        }
    }
}

impl fmt::Display for MembershipSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
