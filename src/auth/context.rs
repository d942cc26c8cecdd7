//! Per-request identity

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Roles a user can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Lender,
    Borrower,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Lender => "lender",
            Role::Borrower => "borrower",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "lender" => Some(Role::Lender),
            "borrower" => Some(Role::Borrower),
            _ => None,
        }
    }

    /// Landing page a signed-in user is sent to
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::Lender => "/lender/dashboard",
            Role::Borrower => "/borrower/dashboard",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the caller, passed explicitly into every service operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn lender(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Lender)
    }

    pub fn borrower(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Borrower)
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self::new(user_id, Role::Admin)
    }
}
