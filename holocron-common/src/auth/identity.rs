//! Caller identity derived from a verified token

use serde::{Deserialize, Serialize};

use super::role::UserRole;

/// The authenticated subject of one request.
///
/// Built by the credential verifier from token claims and attached to the
/// request for downstream handlers. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    /// Subject claim (user id)
    pub id: String,
    /// Email claim (empty when the token carried none)
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl CallerIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            username: None,
        }
    }
}
