//! Request pipeline for the project-flow API.
//!
//! Every call to the API goes through [`RequestPipeline`]:
//!
//! - **Outbound**: the current session token is attached as a bearer
//!   credential, synchronously, just before dispatch
//! - **Inbound**: the `{ code, message, data }` [`Envelope`] is unwrapped;
//!   failures are classified into [`ApiError`], shown to the user and
//!   returned to the caller
//! - **Authentication failures** (envelope or HTTP 401) additionally clear
//!   the session and send the UI to the login route
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pflow_client::{ClientConfig, RequestPipeline};
//! # use pflow_core::{Navigator, Notifier};
//! use pflow_store::{MemoryStorage, SessionStore};
//!
//! # struct Ui;
//! # impl Navigator for Ui { fn go_to(&self, _: &str) {} }
//! # impl Notifier for Ui { fn error(&self, _: &str) {} }
//! # async fn example() -> Result<(), pflow_client::ApiError> {
//! let session = Arc::new(SessionStore::load(Arc::new(MemoryStorage::new())));
//! let ui = Arc::new(Ui);
//! let pipeline = RequestPipeline::new(ClientConfig::default(), session, ui.clone(), ui)?;
//!
//! let projects: serde_json::Value = pipeline.get("/projects").await?;
//! println!("{projects}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod pipeline;

pub use config::ClientConfig;
pub use envelope::Envelope;
pub use error::{messages, ApiError, Cause, Result};
pub use pipeline::{ApiRequest, RequestPipeline};
