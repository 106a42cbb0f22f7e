//! User identity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque numeric user identifier issued by the chat host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display user as exposed by the host (`initDataUnsafe.user`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: UserId,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

impl HostUser {
    /// Minimal display object for identities that carry only an id.
    pub fn placeholder(id: UserId, first_name: &str) -> Self {
        Self {
            id,
            first_name: first_name.to_string(),
            last_name: None,
            username: None,
            language_code: None,
        }
    }
}

/// Credentials attached to every task service request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: UserId,
    /// Signed host payload, passed through verbatim. Empty for unsigned
    /// identities (URL parameter, local development).
    pub auth_token: String,
}

impl Credentials {
    pub fn new(user_id: UserId, auth_token: impl Into<String>) -> Self {
        Self {
            user_id,
            auth_token: auth_token.into(),
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.auth_token.is_empty()
    }
}
