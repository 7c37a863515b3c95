//! The authenticated-session value and the identity it carries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A role as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Server-side role identifier.
    #[serde(default)]
    pub id: u64,
    /// Stable role code (see [`crate::roles`]).
    #[serde(default)]
    pub code: String,
    /// Human readable role name.
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Role {
    /// Build a role from its code and display name.
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// A user profile as returned by `/login` and `/user/current`.
///
/// Every field is optional on the wire; missing fields take their defaults
/// so that a partially populated profile still loads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned identifier.
    #[serde(default)]
    pub id: UserId,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub phone: String,
    /// Department the user belongs to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub department: String,
    /// The user's single role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Account status (`1` enabled, `0` disabled).
    #[serde(default)]
    pub status: i32,
    /// When the account was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the account was last modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// The user's role code, or `""` when the profile carries no role.
    #[must_use]
    pub fn role_code(&self) -> &str {
        self.role.as_ref().map_or("", |role| role.code.as_str())
    }
}

/// The client's authenticated identity: a bearer token plus the user it
/// belongs to.
///
/// An empty token means "not authenticated"; there is no other signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token, empty when absent.
    pub token: String,
    /// The authenticated user, default when absent.
    pub user: User,
}

impl Session {
    /// Create a session from a token and user.
    #[must_use]
    pub fn new(token: impl Into<String>, user: User) -> Self {
        Self {
            token: token.into(),
            user,
        }
    }

    /// The unauthenticated session.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` iff the token is non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// The current user's role code, `""` when unauthenticated.
    #[must_use]
    pub fn role_code(&self) -> &str {
        if self.is_authenticated() {
            self.user.role_code()
        } else {
            ""
        }
    }

    /// Returns `true` iff the session is authenticated and its role code is
    /// one of `allowed`.
    #[must_use]
    pub fn has_role<S: AsRef<str>>(&self, allowed: &[S]) -> bool {
        let code = self.role_code();
        !code.is_empty() && allowed.iter().any(|a| a.as_ref() == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles;

    fn member() -> User {
        User {
            id: UserId::new(3),
            name: "Bob".to_string(),
            role: Some(Role::new(roles::TEAM_MEMBER, "Team member")),
            ..User::default()
        }
    }

    #[test]
    fn empty_session_is_unauthenticated() {
        let session = Session::empty();
        assert!(!session.is_authenticated());
        assert_eq!(session.role_code(), "");
        assert!(!session.has_role(&roles::ALL));
    }

    #[test]
    fn has_role_checks_membership() {
        let session = Session::new("t", member());
        assert!(session.has_role(&[roles::TEAM_MEMBER]));
        assert!(session.has_role(&roles::ALL));
        assert!(!session.has_role(&[roles::ADMIN, roles::DEPT_MANAGER]));
        assert!(!session.has_role::<&str>(&[]));
    }

    #[test]
    fn token_without_role_has_no_role() {
        let session = Session::new("t", User::default());
        assert!(session.is_authenticated());
        assert!(!session.has_role(&[""]));
    }

    #[test]
    fn user_tolerates_sparse_json() {
        let user: User = serde_json::from_str(r#"{"id": 9, "role": {"code": "admin"}}"#).unwrap();
        assert_eq!(user.id, UserId::new(9));
        assert_eq!(user.role_code(), "admin");
        assert!(user.name.is_empty());

        let full: User = serde_json::from_str(
            r#"{"id":1,"username":"alice","name":"Alice","email":"a@example.com",
                "role_id":1,"role":{"id":1,"name":"Admin","code":"admin"},
                "status":1,"created_at":"2024-01-02T03:04:05Z"}"#,
        )
        .unwrap();
        assert_eq!(full.username, "alice");
        assert!(full.created_at.is_some());
    }
}
