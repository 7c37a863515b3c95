//! Committing navigations.

use std::collections::BTreeMap;
use std::sync::Arc;

use pflow_core::{Navigator, Session};
use pflow_store::SessionStore;

use crate::guard::{Decision, RouteGuard};
use crate::route::{normalize, Resolution, RouteTable};

/// Upper bound on redirects followed for a single navigation.
pub const MAX_REDIRECTS: usize = 8;

/// A navigation that was committed to the [`Navigator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// The path the navigator was sent to.
    pub path: String,
    /// Name of the route that was entered, if any.
    pub route: Option<String>,
    /// Page title of that route.
    pub title: Option<String>,
    /// Parameters captured from the path.
    pub params: BTreeMap<String, String>,
}

impl Navigation {
    fn bare(path: String) -> Self {
        Self {
            path,
            route: None,
            title: None,
            params: BTreeMap::new(),
        }
    }
}

/// Resolves navigation requests against the route table and the current
/// session and instructs the [`Navigator`] with the outcome.
pub struct Router {
    table: RouteTable,
    guard: RouteGuard,
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    /// Create a router.
    #[must_use]
    pub fn new(
        table: RouteTable,
        guard: RouteGuard,
        session: Arc<SessionStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            table,
            guard,
            session,
            navigator,
        }
    }

    /// The route table in use.
    #[must_use]
    pub const fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigate to `path`.
    ///
    /// Table redirects and guard redirects are followed until an allowed
    /// page is reached; the navigator is then called exactly once with the
    /// final path.
    pub fn navigate(&self, path: &str) -> Navigation {
        let navigation = self.resolve(path);
        tracing::debug!(requested = path, committed = %navigation.path, "Navigating");
        self.navigator.go_to(&navigation.path);
        navigation
    }

    /// Work out where a navigation to `path` would end up without
    /// committing it.
    ///
    /// The session is read once, so every hop sees the same state. If no
    /// allowed page is reached within [`MAX_REDIRECTS`] hops the result is
    /// the login target.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Navigation {
        let session = self.session.snapshot();
        let mut current = normalize(path);

        for _ in 0..=MAX_REDIRECTS {
            match self.step(&current, &session) {
                Ok(navigation) => return navigation,
                Err(next) => current = normalize(&next),
            }
        }

        tracing::warn!(requested = path, last = %current, "Redirect loop, falling back to login");
        Navigation::bare(self.guard.login_path().to_string())
    }

    /// One hop: either the committed navigation or the next path to try.
    fn step(&self, path: &str, session: &Session) -> Result<Navigation, String> {
        let matched = match self.table.resolve(path) {
            Some(Resolution::Page(matched)) => matched,
            Some(Resolution::Redirect(to)) => return Err(to),
            None => {
                tracing::debug!(path, "No route matches, redirecting home");
                return Err(self.guard.home_path().to_string());
            }
        };

        match self.guard.evaluate(&matched.path, matched.meta, session) {
            Decision::Allow => Ok(Navigation {
                path: matched.path,
                route: Some(matched.route.name.clone()),
                title: matched.meta.title.clone(),
                params: matched.params,
            }),
            Decision::Redirect(to) => Err(to),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.routes().len())
            .field("guard", &self.guard)
            .finish_non_exhaustive()
    }
}
