//! Route configuration.
//!
//! A [`RouteTable`] is an ordered list of [`Route`]s plus an optional
//! catch-all redirect. Patterns are absolute paths whose segments are either
//! literals or `:name` parameters. The first matching route wins.

use std::collections::BTreeMap;

use pflow_core::roles;

/// Access metadata attached to a navigable page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    /// Reachable without a session.
    pub public: bool,
    /// Role codes allowed to enter. Empty means any authenticated user.
    pub required_roles: Vec<String>,
    /// Human-readable page title.
    pub title: Option<String>,
}

impl RouteMeta {
    /// A page anyone may open.
    #[must_use]
    pub fn public() -> Self {
        Self {
            public: true,
            ..Self::default()
        }
    }

    /// A page that needs a session but no particular role.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// A page restricted to the given role codes.
    #[must_use]
    pub fn restricted<S: Into<String>>(roles: impl IntoIterator<Item = S>) -> Self {
        Self {
            required_roles: roles.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Set the page title.
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// What a matched route leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// A page guarded by its metadata.
    Page(RouteMeta),
    /// An unconditional redirect to another path.
    Redirect(String),
}

/// A single entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Stable route name.
    pub name: String,
    /// Path pattern, e.g. `/projects/:id`.
    pub pattern: String,
    /// Page or redirect.
    pub kind: RouteKind,
}

impl Route {
    /// A page route.
    #[must_use]
    pub fn page(name: impl Into<String>, pattern: impl Into<String>, meta: RouteMeta) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            kind: RouteKind::Page(meta),
        }
    }

    /// A redirect route.
    #[must_use]
    pub fn redirect(pattern: impl Into<String>, to: impl Into<String>) -> Self {
        let pattern = pattern.into();
        Self {
            name: pattern.clone(),
            pattern,
            kind: RouteKind::Redirect(to.into()),
        }
    }

    /// The page metadata, `None` for redirects.
    #[must_use]
    pub const fn meta(&self) -> Option<&RouteMeta> {
        match &self.kind {
            RouteKind::Page(meta) => Some(meta),
            RouteKind::Redirect(_) => None,
        }
    }

    /// Match `path` (already normalized) against this route's pattern and
    /// return the captured parameters.
    fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let pattern: Vec<&str> = segments(&self.pattern).collect();
        let actual: Vec<&str> = segments(path).collect();
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, value) in pattern.into_iter().zip(actual) {
            match expected.strip_prefix(':') {
                Some(name) => {
                    params.insert(name.to_string(), value.to_string());
                }
                None if expected == value => {}
                None => return None,
            }
        }
        Some(params)
    }
}

/// A page route matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The matched route.
    pub route: &'a Route,
    /// Access metadata of the matched page.
    pub meta: &'a RouteMeta,
    /// The normalized path that matched.
    pub path: String,
    /// Values captured by `:name` segments.
    pub params: BTreeMap<String, String>,
}

/// Outcome of looking a path up in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// A page matched.
    Page(RouteMatch<'a>),
    /// A redirect route or the catch-all matched.
    Redirect(String),
}

/// The application's routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: Option<String>,
}

impl RouteTable {
    /// An empty table with no catch-all.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route. Earlier routes take precedence.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Redirect every path no route matches to `to`.
    #[must_use]
    pub fn fallback(mut self, to: impl Into<String>) -> Self {
        self.fallback = Some(to.into());
        self
    }

    /// The routes in match order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// The project-flow route configuration.
    ///
    /// `/login` is public, the operation log and user management are
    /// restricted to administrators and department managers, every other page
    /// needs a session. `/` and unknown paths go to the dashboard.
    #[must_use]
    pub fn standard() -> Self {
        let managers = [roles::ADMIN, roles::DEPT_MANAGER];

        Self::new()
            .route(Route::page("login", "/login", RouteMeta::public().titled("Sign in")))
            .route(Route::redirect("/", "/dashboard"))
            .route(Route::page(
                "dashboard",
                "/dashboard",
                RouteMeta::authenticated().titled("Dashboard"),
            ))
            .route(Route::page(
                "projects",
                "/projects",
                RouteMeta::authenticated().titled("Projects"),
            ))
            .route(Route::page(
                "project-detail",
                "/projects/:id",
                RouteMeta::authenticated().titled("Project details"),
            ))
            .route(Route::page(
                "tasks",
                "/tasks",
                RouteMeta::authenticated().titled("Tasks"),
            ))
            .route(Route::page(
                "task-detail",
                "/tasks/:id",
                RouteMeta::authenticated().titled("Task details"),
            ))
            .route(Route::page(
                "my-tasks",
                "/my-tasks",
                RouteMeta::authenticated().titled("My tasks"),
            ))
            .route(Route::page(
                "knowledge",
                "/knowledge",
                RouteMeta::authenticated().titled("Knowledge base"),
            ))
            .route(Route::page(
                "knowledge-detail",
                "/knowledge/:id",
                RouteMeta::authenticated().titled("Knowledge entry"),
            ))
            .route(Route::page(
                "expenses",
                "/expenses",
                RouteMeta::authenticated().titled("Expenses"),
            ))
            .route(Route::page(
                "logs",
                "/logs",
                RouteMeta::restricted(managers).titled("Operation log"),
            ))
            .route(Route::page(
                "users",
                "/users",
                RouteMeta::restricted(managers).titled("User management"),
            ))
            .route(Route::page(
                "profile",
                "/profile",
                RouteMeta::authenticated().titled("Profile"),
            ))
            .fallback("/dashboard")
    }

    /// Look `path` up. Returns `None` only when nothing matches and the
    /// table has no catch-all.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<Resolution<'_>> {
        let path = normalize(path);

        for route in &self.routes {
            let Some(params) = route.captures(&path) else {
                continue;
            };
            return Some(match &route.kind {
                RouteKind::Page(meta) => Resolution::Page(RouteMatch {
                    route,
                    meta,
                    path,
                    params,
                }),
                RouteKind::Redirect(to) => Resolution::Redirect(to.clone()),
            });
        }

        self.fallback.clone().map(Resolution::Redirect)
    }
}

/// Canonical form of a navigation target: leading slash, no query or
/// fragment, no empty segments.
#[must_use]
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let joined = segments(path).collect::<Vec<_>>().join("/");
    format!("/{joined}")
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(table: &'a RouteTable, path: &str) -> RouteMatch<'a> {
        match table.resolve(path) {
            Some(Resolution::Page(m)) => m,
            other => panic!("expected a page for {path}, got {other:?}"),
        }
    }

    #[test]
    fn normalize_paths() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("projects/"), "/projects");
        assert_eq!(normalize("//tasks//7/"), "/tasks/7");
        assert_eq!(normalize("/projects?page=2#top"), "/projects");
    }

    #[test]
    fn literal_routes_match() {
        let table = RouteTable::standard();
        let m = page(&table, "/dashboard");
        assert_eq!(m.route.name, "dashboard");
        assert!(m.params.is_empty());
        assert_eq!(m.meta.title.as_deref(), Some("Dashboard"));
    }

    #[test]
    fn parameters_are_captured() {
        let table = RouteTable::standard();
        let m = page(&table, "/projects/42/");
        assert_eq!(m.route.name, "project-detail");
        assert_eq!(m.path, "/projects/42");
        assert_eq!(m.params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn root_and_unknown_paths_redirect() {
        let table = RouteTable::standard();
        assert_eq!(
            table.resolve("/"),
            Some(Resolution::Redirect("/dashboard".to_string()))
        );
        assert_eq!(
            table.resolve("/no/such/page"),
            Some(Resolution::Redirect("/dashboard".to_string()))
        );
    }

    #[test]
    fn no_fallback_means_unresolved() {
        let table = RouteTable::new().route(Route::page("a", "/a", RouteMeta::public()));
        assert!(table.resolve("/b").is_none());
        assert!(table.resolve("/a/b").is_none());
    }

    #[test]
    fn restricted_pages_carry_roles() {
        let table = RouteTable::standard();
        for path in ["/logs", "/users"] {
            let m = page(&table, path);
            assert_eq!(m.meta.required_roles, vec!["admin", "dept_manager"]);
            assert!(!m.meta.public);
        }
        assert!(page(&table, "/login").meta.public);
    }

    #[test]
    fn first_match_wins() {
        let table = RouteTable::new()
            .route(Route::page("new", "/tasks/new", RouteMeta::authenticated()))
            .route(Route::page("detail", "/tasks/:id", RouteMeta::authenticated()));
        assert_eq!(page(&table, "/tasks/new").route.name, "new");
        assert_eq!(page(&table, "/tasks/3").route.name, "detail");
    }
}
