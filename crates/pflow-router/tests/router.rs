//! End-to-end navigation through the standard route table.

use std::sync::Arc;

use pflow_core::{roles, RecordingNavigator, Role, User, UserId};
use pflow_router::{Route, RouteGuard, RouteMeta, RouteTable, Router};
use pflow_store::{MemoryStorage, SessionStore};

struct Harness {
    router: Router,
    session: Arc<SessionStore>,
    navigator: Arc<RecordingNavigator>,
}

impl Harness {
    fn new() -> Self {
        Self::with_table(RouteTable::standard())
    }

    fn with_table(table: RouteTable) -> Self {
        let session = Arc::new(SessionStore::load(Arc::new(MemoryStorage::new())));
        let navigator = Arc::new(RecordingNavigator::default());
        let router = Router::new(
            table,
            RouteGuard::default(),
            session.clone(),
            navigator.clone(),
        );
        Self {
            router,
            session,
            navigator,
        }
    }

    fn log_in(&self, username: &str, role: &str) {
        let user = User {
            id: UserId::new(7),
            username: username.to_string(),
            name: username.to_string(),
            role: Some(Role::new(role, role)),
            ..User::default()
        };
        self.session.set("token", user).unwrap();
    }
}

#[test]
fn team_member_is_kept_out_of_the_operation_log() {
    let h = Harness::new();
    h.log_in("bob", roles::TEAM_MEMBER);

    let navigation = h.router.navigate("/logs");

    assert_eq!(navigation.path, "/dashboard");
    assert_eq!(navigation.route.as_deref(), Some("dashboard"));
    assert_eq!(h.navigator.visits(), vec!["/dashboard"]);
}

#[test]
fn admin_reaches_restricted_pages() {
    let h = Harness::new();
    h.log_in("alice", roles::ADMIN);

    for path in ["/logs", "/users"] {
        assert_eq!(h.router.navigate(path).path, path);
    }
    assert_eq!(h.navigator.visits(), vec!["/logs", "/users"]);
}

#[test]
fn anonymous_user_is_sent_to_login() {
    let h = Harness::new();

    let navigation = h.router.navigate("/projects/42");

    assert_eq!(navigation.path, "/login");
    assert_eq!(navigation.title.as_deref(), Some("Sign in"));
    assert!(navigation.params.is_empty());
    assert_eq!(h.navigator.visits(), vec!["/login"]);
}

#[test]
fn logged_in_user_skips_login_page() {
    let h = Harness::new();
    h.log_in("alice", roles::TEAM_LEADER);

    assert_eq!(h.router.navigate("/login").path, "/dashboard");
}

#[test]
fn parameters_survive_admission() {
    let h = Harness::new();
    h.log_in("carol", roles::TEAM_LEADER);

    let navigation = h.router.navigate("/tasks/19?tab=comments");

    assert_eq!(navigation.path, "/tasks/19");
    assert_eq!(navigation.route.as_deref(), Some("task-detail"));
    assert_eq!(navigation.params.get("id").map(String::as_str), Some("19"));
}

#[test]
fn root_and_unknown_paths_land_on_dashboard() {
    let h = Harness::new();
    h.log_in("alice", roles::DEPT_MANAGER);

    assert_eq!(h.router.navigate("/").path, "/dashboard");
    assert_eq!(h.router.navigate("/reports/2024").path, "/dashboard");
    assert_eq!(h.navigator.visits(), vec!["/dashboard", "/dashboard"]);
}

#[test]
fn unknown_path_without_session_ends_at_login() {
    let h = Harness::new();
    assert_eq!(h.router.navigate("/nowhere").path, "/login");
}

#[test]
fn logout_changes_admission() {
    let h = Harness::new();
    h.log_in("alice", roles::ADMIN);
    assert_eq!(h.router.navigate("/users").path, "/users");

    h.session.clear().unwrap();
    assert_eq!(h.router.navigate("/users").path, "/login");
}

#[test]
fn public_pages_open_for_everyone() {
    let table = RouteTable::standard().route(Route::page("about", "/about", RouteMeta::public()));
    let h = Harness::with_table(table);

    assert_eq!(h.router.navigate("/about").path, "/about");
    h.log_in("bob", roles::TEAM_MEMBER);
    assert_eq!(h.router.navigate("/about").path, "/about");
}

#[test]
fn redirect_loop_resolves_to_login() {
    let table = RouteTable::new()
        .route(Route::redirect("/a", "/b"))
        .route(Route::redirect("/b", "/a"));
    let h = Harness::with_table(table);

    let navigation = h.router.navigate("/a");

    assert_eq!(navigation.path, "/login");
    assert!(navigation.route.is_none());
    assert_eq!(h.navigator.visits(), vec!["/login"]);
}

#[test]
fn resolve_does_not_navigate() {
    let h = Harness::new();
    assert_eq!(h.router.resolve("/expenses").path, "/login");
    assert!(h.navigator.visits().is_empty());
}
