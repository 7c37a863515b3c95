//! Command execution.
//!
//! [`App`] wires the session store, request pipeline, auth gateway and
//! router together and runs one [`Command`] against them. Handlers return
//! the text to print on stdout; redirects and failure messages reach the
//! terminal through the injected navigator and notifier.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use pflow_auth::{AuthGateway, ChangePasswordRequest, LoginRequest, Permissions};
use pflow_client::{ApiRequest, ClientConfig, RequestPipeline};
use pflow_router::{RouteGuard, RouteTable, Router};
use pflow_store::{RocksStorage, SessionStorage, SessionStore};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::terminal::{TerminalNavigator, TerminalNotifier};
use crate::Command;

/// Where the client talks to and where it keeps its session.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API base URL.
    pub api_url: String,
    /// RocksDB directory holding the persisted session.
    pub data_dir: PathBuf,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

/// The wired-up client.
pub struct App {
    pipeline: Arc<RequestPipeline>,
    auth: AuthGateway,
    router: Router,
    navigator: Arc<TerminalNavigator>,
}

impl App {
    /// Open the persisted session under `settings.data_dir` and build the
    /// client around it.
    pub fn open(settings: &Settings) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&settings.data_dir).with_context(|| {
            format!("failed to create data directory {}", settings.data_dir.display())
        })?;
        tracing::debug!(path = %settings.data_dir.display(), "Opening session storage");
        let storage = RocksStorage::open(&settings.data_dir).with_context(|| {
            format!("failed to open session storage in {}", settings.data_dir.display())
        })?;

        let mut config = ClientConfig::with_base_url(&settings.api_url);
        config.request_timeout_seconds = settings.timeout_seconds;

        Self::build(config, Arc::new(storage), Arc::new(TerminalNavigator::new()))
    }

    fn build(
        config: ClientConfig,
        storage: Arc<dyn SessionStorage>,
        navigator: Arc<TerminalNavigator>,
    ) -> anyhow::Result<Self> {
        let session = Arc::new(SessionStore::load(storage));
        let guard = RouteGuard::from_config(&config);
        let pipeline = Arc::new(RequestPipeline::new(
            config,
            session.clone(),
            navigator.clone(),
            Arc::new(TerminalNotifier),
        )?);

        Ok(Self {
            auth: AuthGateway::new(pipeline.clone()),
            router: Router::new(RouteTable::standard(), guard, session, navigator.clone()),
            pipeline,
            navigator,
        })
    }

    /// Where the UI ended up, if any command moved it.
    pub fn location(&self) -> Option<String> {
        self.navigator.location()
    }

    /// Run `command` and return its stdout output.
    pub async fn run(&self, command: Command) -> anyhow::Result<String> {
        match command {
            Command::Login { username, password } => self.login(username, password).await,
            Command::Logout => self.logout().await,
            Command::Whoami => self.whoami().await,
            Command::Passwd { current, new } => self.passwd(current, new).await,
            Command::Roles => self.roles().await,
            Command::Navigate { path } => Ok(self.navigate(&path)),
            Command::Get { path, query } => self.get(&path, &query).await,
            Command::Download { path, output } => self.download(&path, &output).await,
        }
    }

    async fn login(&self, username: String, password: String) -> anyhow::Result<String> {
        let session = self.auth.login(&LoginRequest::new(username, password)).await?;
        let navigation = self.router.navigate(self.router_home());
        Ok(format!(
            "Logged in as {} ({})\nLanded on {}",
            display_name(&session.user),
            or_none(session.user.role_code()),
            navigation.path
        ))
    }

    async fn logout(&self) -> anyhow::Result<String> {
        if !self.auth.session().is_authenticated() {
            return Ok("Not logged in".to_string());
        }
        // The local session is gone whatever the server answered.
        match self.auth.logout().await {
            Ok(()) => Ok("Logged out".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Server did not confirm logout");
                Ok("Logged out locally".to_string())
            }
        }
    }

    async fn whoami(&self) -> anyhow::Result<String> {
        if !self.auth.session().is_authenticated() {
            bail!("not logged in");
        }
        let user = self.auth.refresh_current_user().await?;
        let permissions = Permissions::for_role(user.role_code());

        let mut out = String::new();
        writeln!(out, "username:   {}", user.username)?;
        writeln!(out, "name:       {}", or_none(&user.name))?;
        writeln!(out, "email:      {}", or_none(&user.email))?;
        writeln!(out, "department: {}", or_none(&user.department))?;
        writeln!(out, "role:       {}", or_none(user.role_code()))?;
        write!(out, "can:        {}", capabilities(&permissions))?;
        Ok(out)
    }

    async fn passwd(&self, current: String, new: String) -> anyhow::Result<String> {
        if current == new {
            bail!("the new password must differ from the current one");
        }
        self.auth
            .change_password(&ChangePasswordRequest {
                old_password: current,
                new_password: new,
            })
            .await?;
        Ok("Password changed".to_string())
    }

    async fn roles(&self) -> anyhow::Result<String> {
        let roles = self.auth.list_roles().await?;
        let width = roles.iter().map(|r| r.code.len()).max().unwrap_or(0);

        let mut out = String::new();
        for role in roles {
            writeln!(out, "{:width$}  {}", role.code, role.name)?;
        }
        Ok(out.trim_end().to_string())
    }

    fn navigate(&self, path: &str) -> String {
        let navigation = self.router.navigate(path);
        match navigation.title {
            Some(title) => format!("{} ({title})", navigation.path),
            None => navigation.path,
        }
    }

    async fn get(&self, path: &str, query: &[String]) -> anyhow::Result<String> {
        let mut request = ApiRequest::get(path);
        for pair in query {
            let Some((key, value)) = pair.split_once('=') else {
                bail!("query parameter {pair:?} is not of the form key=value");
            };
            request = request.query(key, value);
        }

        let data: Value = self.pipeline.send(request).await?;
        Ok(serde_json::to_string_pretty(&data)?)
    }

    async fn download(&self, path: &str, output: &Path) -> anyhow::Result<String> {
        let mut response = self.pipeline.download(path).await?;
        let status = response.status();
        if !status.is_success() {
            bail!("download of {path} failed with status {status}");
        }

        let mut file = tokio::fs::File::create(output)
            .await
            .with_context(|| format!("failed to create {}", output.display()))?;
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len();
        }
        file.flush().await?;

        tracing::debug!(path, bytes = written, "Download complete");
        Ok(format!("Saved {written} bytes to {}", output.display()))
    }

    fn router_home(&self) -> &str {
        &self.pipeline.config().home_path
    }
}

fn display_name(user: &pflow_core::User) -> &str {
    if user.name.is_empty() {
        &user.username
    } else {
        &user.name
    }
}

fn or_none(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

fn capabilities(permissions: &Permissions) -> String {
    let granted: Vec<&str> = [
        (permissions.can_manage_users(), "manage-users"),
        (permissions.can_manage_project(), "manage-projects"),
        (permissions.can_create_project(), "create-projects"),
        (permissions.can_manage_knowledge(), "manage-knowledge"),
        (permissions.can_view_logs(), "view-logs"),
    ]
    .into_iter()
    .filter_map(|(granted, name)| granted.then_some(name))
    .collect();

    if granted.is_empty() {
        "-".to_string()
    } else {
        granted.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok(data: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"code": 200, "message": "success", "data": data}))
    }

    fn app(server: &MockServer, dir: &TempDir) -> App {
        let storage = Arc::new(RocksStorage::open(dir.path()).unwrap());
        let config = ClientConfig::with_base_url(format!("{}/api", server.uri()));
        App::build(config, storage, Arc::new(TerminalNavigator::quiet())).unwrap()
    }

    async fn mount_login(server: &MockServer, role: &str) {
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ok(json!({
                "token": "abc",
                "user": {"id": 1, "username": "alice", "name": "Alice", "role": {"code": role, "name": role}}
            })))
            .mount(server)
            .await;
    }

    fn login() -> Command {
        Command::Login {
            username: "alice".to_string(),
            password: "x".to_string(),
        }
    }

    #[tokio::test]
    async fn login_persists_across_runs() {
        let server = MockServer::start().await;
        mount_login(&server, "team_member").await;
        Mock::given(method("GET"))
            .and(path("/api/user/current"))
            .and(header("authorization", "Bearer abc"))
            .respond_with(ok(json!({"id": 1, "username": "alice", "name": "Alice", "role": {"code": "team_member", "name": "Team member"}})))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();

        {
            let app = app(&server, &dir);
            let out = app.run(login()).await.unwrap();
            assert!(out.contains("Logged in as Alice (team_member)"));
            assert_eq!(app.location().as_deref(), Some("/dashboard"));
        }

        let app = app(&server, &dir);
        let out = app.run(Command::Whoami).await.unwrap();
        assert!(out.contains("username:   alice"));
        assert!(out.contains("create-projects"));
        assert!(!out.contains("view-logs"));
    }

    #[tokio::test]
    async fn navigate_applies_role_guard() {
        let server = MockServer::start().await;
        mount_login(&server, "team_member").await;
        let dir = TempDir::new().unwrap();
        let app = app(&server, &dir);

        assert_eq!(
            app.run(Command::Navigate { path: "/logs".to_string() }).await.unwrap(),
            "/login (Sign in)"
        );

        app.run(login()).await.unwrap();
        assert_eq!(
            app.run(Command::Navigate { path: "/logs".to_string() }).await.unwrap(),
            "/dashboard (Dashboard)"
        );
        assert_eq!(app.location().as_deref(), Some("/dashboard"));
    }

    #[tokio::test]
    async fn logout_without_server_still_clears() {
        let server = MockServer::start().await;
        mount_login(&server, "admin").await;
        Mock::given(method("POST"))
            .and(path("/api/logout"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let app = app(&server, &dir);
        app.run(login()).await.unwrap();

        let out = app.run(Command::Logout).await.unwrap();

        assert_eq!(out, "Logged out locally");
        assert_eq!(app.location().as_deref(), Some("/login"));
        assert_eq!(app.run(Command::Logout).await.unwrap(), "Not logged in");
        assert!(app.run(Command::Whoami).await.is_err());
    }

    #[tokio::test]
    async fn get_prints_data_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/projects"))
            .and(query_param("page", "2"))
            .respond_with(ok(json!({"total": 1, "list": [{"id": 3}]})))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let app = app(&server, &dir);

        let out = app
            .run(Command::Get {
                path: "/projects".to_string(),
                query: vec!["page=2".to_string()],
            })
            .await
            .unwrap();
        let printed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(printed["list"][0]["id"], 3);

        let err = app
            .run(Command::Get {
                path: "/projects".to_string(),
                query: vec!["page".to_string()],
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("key=value"));
    }

    #[tokio::test]
    async fn download_writes_raw_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/documents/9/download"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 raw".to_vec()))
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let app = app(&server, &dir);
        let output = dir.path().join("doc.pdf");

        let out = app
            .run(Command::Download {
                path: "/documents/9/download".to_string(),
                output: output.clone(),
            })
            .await
            .unwrap();

        assert_eq!(out, format!("Saved 12 bytes to {}", output.display()));
        assert_eq!(std::fs::read(&output).unwrap(), b"%PDF-1.4 raw");
    }

    #[tokio::test]
    async fn passwd_rejects_unchanged_password() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let app = app(&server, &dir);

        let err = app
            .run(Command::Passwd {
                current: "same".to_string(),
                new: "same".to_string(),
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn capabilities_follow_role() {
        assert_eq!(capabilities(&Permissions::for_role("")), "-");
        assert_eq!(
            capabilities(&Permissions::for_role("admin")),
            "manage-users, manage-projects, manage-knowledge, view-logs"
        );
    }
}
