use serde::{Deserialize, Serialize};

/// Role the event channel connects with. Decides which broadcast group gets
/// joined once the connection is up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Operations staff; joins the admin broadcast group.
    #[default]
    Admin,
    /// Delivery handler; joins the pilot group scoped to a user identifier.
    Pilot,
    /// Any other configured role. No group is joined.
    Unrecognized(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Pilot => "pilot",
            Role::Unrecognized(other) => other,
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value {
            "admin" => Role::Admin,
            "pilot" => Role::Pilot,
            other => Role::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
