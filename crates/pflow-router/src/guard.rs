//! Navigation admission.
//!
//! [`RouteGuard::evaluate`] is a pure function of the target's metadata and
//! the session. It never fails: being logged out or holding the wrong role
//! turns into a redirect, not an error.

use pflow_client::ClientConfig;
use pflow_core::Session;

use crate::route::{normalize, RouteMeta};

/// Result of evaluating a navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Commit the navigation.
    Allow,
    /// Navigate to this path instead.
    Redirect(String),
}

/// Decides whether a session may enter a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    home_path: String,
}

impl RouteGuard {
    /// A guard redirecting to `login_path` and `home_path`.
    #[must_use]
    pub fn new(login_path: impl AsRef<str>, home_path: impl AsRef<str>) -> Self {
        Self {
            login_path: normalize(login_path.as_ref()),
            home_path: normalize(home_path.as_ref()),
        }
    }

    /// A guard using the configured login and home paths.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.login_path, &config.home_path)
    }

    /// The login target.
    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// The default home target.
    #[must_use]
    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Decide the navigation to `target`, whose page carries `meta`.
    ///
    /// Rules, first match wins:
    ///
    /// 1. a logged-in user heading for the login page goes home
    /// 2. public pages are allowed
    /// 3. without a session, go to login (the original target is dropped)
    /// 4. a page with required roles the user lacks sends them home
    /// 5. allow
    #[must_use]
    pub fn evaluate(&self, target: &str, meta: &RouteMeta, session: &Session) -> Decision {
        if meta.public {
            if session.is_authenticated() && normalize(target) == self.login_path {
                return Decision::Redirect(self.home_path.clone());
            }
            return Decision::Allow;
        }

        if !session.is_authenticated() {
            return Decision::Redirect(self.login_path.clone());
        }

        if !meta.required_roles.is_empty() && !session.has_role(&meta.required_roles) {
            tracing::debug!(
                path = target,
                role = session.role_code(),
                "Role not permitted, redirecting home"
            );
            return Decision::Redirect(self.home_path.clone());
        }

        Decision::Allow
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}
