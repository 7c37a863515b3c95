//! Login, logout and profile refresh.
//!
//! Every network operation goes through the [`RequestPipeline`], so failures
//! arrive already classified (and already shown to the user). This module
//! only decides what each outcome means for the session.

use std::sync::Arc;

use pflow_client::{ApiRequest, RequestPipeline, Result};
use pflow_core::{Role, Session, User};
use pflow_store::SessionStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoints;

/// Request payload for username/password login.
#[derive(Clone, Serialize)]
pub struct LoginRequest {
    /// Login name.
    pub username: String,
    /// Password.
    pub password: String,
}

impl LoginRequest {
    /// Build a login request.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// `data` of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: User,
}

/// Request payload for changing the current user's password.
#[derive(Clone, Serialize)]
pub struct ChangePasswordRequest {
    /// Current password.
    pub old_password: String,
    /// Replacement password.
    pub new_password: String,
}

impl std::fmt::Debug for ChangePasswordRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangePasswordRequest").finish_non_exhaustive()
    }
}

/// Performs the session-changing network operations.
#[derive(Debug, Clone)]
pub struct AuthGateway {
    pipeline: Arc<RequestPipeline>,
}

impl AuthGateway {
    /// Create a gateway on top of `pipeline`.
    #[must_use]
    pub const fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }

    /// The session store this gateway drives.
    #[must_use]
    pub fn session(&self) -> &SessionStore {
        self.pipeline.session()
    }

    /// Authenticate with username and password.
    ///
    /// On success the token and user are stored together and the new
    /// session is returned.
    ///
    /// # Errors
    ///
    /// Returns the classified failure (invalid credentials arrive as an
    /// authentication or validation error) and leaves the session as it was.
    /// Returns `ApiError::Storage` if the session could not be persisted.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<Session> {
        tracing::debug!(username = %credentials.username, "Logging in");

        let response: LoginResponse = self.pipeline.post(endpoints::LOGIN, credentials).await?;
        self.session()
            .set(response.token.clone(), response.user.clone())?;

        tracing::info!(username = %credentials.username, "Logged in");
        Ok(Session::new(response.token, response.user))
    }

    /// End the session.
    ///
    /// The server is asked to invalidate the token first. Whatever happens to
    /// that call, including the returned future being dropped before it
    /// completes, the session is then cleared and the UI is sent to the
    /// login route, exactly once.
    ///
    /// # Errors
    ///
    /// Returns the server call's failure after cleanup has run.
    pub async fn logout(&self) -> Result<()> {
        let cleanup = LogoutCleanup {
            pipeline: &self.pipeline,
        };

        let result = self
            .pipeline
            .send::<Value>(ApiRequest::post(endpoints::LOGOUT))
            .await;
        drop(cleanup);

        if let Err(e) = &result {
            tracing::warn!(error = %e, "Server-side logout failed, session cleared locally");
        }
        result.map(drop)
    }

    /// Re-read the current user's profile and store it under the current
    /// token.
    ///
    /// The fetched profile is only stored if the session that issued the
    /// call is still the current one; it is returned either way.
    ///
    /// # Errors
    ///
    /// Returns the classified failure and leaves the session as it was,
    /// except that an authentication failure ends it.
    pub async fn refresh_current_user(&self) -> Result<User> {
        let generation = self.session().generation();

        let user: User = self.pipeline.get(endpoints::CURRENT_USER).await?;
        if self.session().replace_user(generation, user.clone())? {
            tracing::debug!(user_id = %user.id, role = user.role_code(), "Refreshed current user");
        } else {
            tracing::warn!(user_id = %user.id, "Session changed during profile refresh, not stored");
        }
        Ok(user)
    }

    /// Change the current user's password.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<()> {
        self.pipeline
            .post::<_, Value>(endpoints::CHANGE_PASSWORD, request)
            .await
            .map(drop)
    }

    /// List every role known to the server.
    ///
    /// # Errors
    ///
    /// Returns the classified failure of the call.
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.pipeline.get(endpoints::ROLES).await
    }
}

/// Clears the session and redirects to login when dropped.
struct LogoutCleanup<'a> {
    pipeline: &'a RequestPipeline,
}

impl Drop for LogoutCleanup<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.pipeline.session().clear() {
            tracing::error!(error = %e, "Failed to clear session on logout");
        }
        self.pipeline
            .navigator()
            .go_to(&self.pipeline.config().login_path);
        tracing::info!("Logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_serializes() {
        let req = LoginRequest::new("alice", "x");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"username": "alice", "password": "x"}));
    }

    #[test]
    fn secrets_are_not_debug_printed() {
        let req = LoginRequest::new("alice", "hunter2");
        assert!(!format!("{req:?}").contains("hunter2"));

        let req = ChangePasswordRequest {
            old_password: "hunter2".to_string(),
            new_password: "Hunter3!".to_string(),
        };
        let printed = format!("{req:?}");
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("Hunter3!"));
    }

    #[test]
    fn login_response_deserializes() {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token": "abc", "user": {"id": 1, "name": "Alice", "role": {"code": "admin", "name": "Admin"}}}"#,
        )
        .unwrap();
        assert_eq!(response.token, "abc");
        assert_eq!(response.user.role_code(), "admin");
    }
}
