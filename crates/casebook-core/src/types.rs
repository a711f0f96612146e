use serde::{Deserialize, Serialize};

/// Caller role supplied by the authentication collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    Officer,
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Officer => "officer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "agent" => Ok(Self::Agent),
            "officer" => Ok(Self::Officer),
            "admin" => Ok(Self::Admin),
            other => Err(crate::error::CoreError::invalid_field(
                "role",
                format!("unrecognized role '{other}'"),
            )),
        }
    }
}

/// Authenticated caller identity. Mutating operations trust this identity and
/// do not re-authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: uuid::Uuid,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: uuid::Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}
