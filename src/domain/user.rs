use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

/// Account kind reported by the authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Organization,
    Developer,
    Student,
    /// Any role string this service does not know about, kept verbatim.
    Other(String),
}

impl FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "organization" => Role::Organization,
            "developer" => Role::Developer,
            "student" => Role::Student,
            _ => Role::Other(s.trim().to_string()),
        })
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Organization => write!(f, "organization"),
            Role::Developer => write!(f, "developer"),
            Role::Student => write!(f, "student"),
            Role::Other(other) => write!(f, "{other}"),
        }
    }
}

/// The authenticated user making a request.
#[derive(Debug, Clone, PartialEq)]
pub struct Caller {
    pub id: UserId,
    pub role: Option<Role>,
    pub display_name: Option<String>,
}

impl Caller {
    pub fn new(id: impl Into<UserId>, role: Option<Role>) -> Self {
        Self {
            id: id.into(),
            role,
            display_name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Role label recorded on audit entries; callers without a role are
    /// treated as organizations.
    pub fn audit_role(&self) -> String {
        match &self.role {
            Some(role) => role.to_string(),
            None => "Organization".to_string(),
        }
    }
}
