//! Project Flow CLI - terminal front-end for the project-flow API.
//!
//! This is the entry point for the `pflow` binary. The session survives
//! between invocations in a RocksDB directory, so `pflow login` followed by
//! `pflow get /projects` behaves like one continuous session.

mod app;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use pflow_client::ApiError;

use app::{App, Settings};

/// Project Flow CLI - terminal front-end for the project-flow API.
#[derive(Parser, Debug)]
#[command(name = "pflow")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API base URL.
    #[arg(
        long,
        env = "PFLOW_API_URL",
        default_value = "http://localhost:8080/project_track/api"
    )]
    api_url: String,

    /// Directory holding the persisted session (default `$HOME/.pflow`).
    #[arg(long, env = "PFLOW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

/// A single client operation.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log in and store the session.
    Login {
        /// Login name.
        #[arg(short, long)]
        username: String,
        /// Password.
        #[arg(long, env = "PFLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// End the session, locally even if the server cannot be reached.
    Logout,
    /// Refresh and show the current user.
    Whoami,
    /// Change the current user's password.
    Passwd {
        /// Current password.
        #[arg(long, env = "PFLOW_PASSWORD", hide_env_values = true)]
        current: String,
        /// New password.
        #[arg(long, env = "PFLOW_NEW_PASSWORD", hide_env_values = true)]
        new: String,
    },
    /// List the roles known to the server.
    Roles,
    /// Navigate to a page and print where the guard lets you land.
    Navigate {
        /// Page path, e.g. `/projects/42`.
        path: String,
    },
    /// GET an API path and print the envelope's data as JSON.
    Get {
        /// API path relative to the base URL.
        path: String,
        /// Query parameter as `key=value`; repeatable.
        #[arg(short, long = "query")]
        query: Vec<String>,
    },
    /// Download a file without envelope handling.
    Download {
        /// API path relative to the base URL.
        path: String,
        /// Output file.
        #[arg(short, long)]
        output: PathBuf,
    },
}

impl Args {
    fn settings(&self) -> Settings {
        let data_dir = self.data_dir.clone().unwrap_or_else(|| {
            std::env::var_os("HOME")
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".pflow")
        });
        Settings {
            api_url: self.api_url.clone(),
            data_dir,
            timeout_seconds: self.timeout,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr; stdout carries command output.
    let default_filter = if args.debug { "warn,pflow=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = args.settings();
    match execute(&settings, args.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if !already_reported(&e) {
                eprintln!("error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn execute(settings: &Settings, command: Command) -> anyhow::Result<String> {
    let app = App::open(settings)?;
    app.run(command).await
}

/// Classified API failures were shown by the notifier when they happened.
fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiError>()
        .is_some_and(|e| e.cause().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn parses_login() {
        let args = Args::try_parse_from([
            "pflow",
            "--api-url",
            "http://api.test/api",
            "login",
            "-u",
            "alice",
            "--password",
            "x",
        ])
        .unwrap();

        assert_eq!(args.api_url, "http://api.test/api");
        assert_eq!(
            args.command,
            Command::Login {
                username: "alice".to_string(),
                password: "x".to_string(),
            }
        );
    }

    #[test]
    fn parses_repeated_query() {
        let args =
            Args::try_parse_from(["pflow", "get", "/tasks", "-q", "page=1", "-q", "size=20"])
                .unwrap();
        assert_eq!(
            args.command,
            Command::Get {
                path: "/tasks".to_string(),
                query: vec!["page=1".to_string(), "size=20".to_string()],
            }
        );
    }

    #[test]
    fn explicit_data_dir_wins() {
        let args =
            Args::try_parse_from(["pflow", "--data-dir", "/tmp/pflow-test", "roles"]).unwrap();
        let settings = args.settings();
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/pflow-test"));
        assert_eq!(settings.timeout_seconds, 30);
    }
}
