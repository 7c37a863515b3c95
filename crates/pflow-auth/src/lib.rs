//! Session lifecycle for the project-flow client.
//!
//! This crate drives every transition of the [`SessionStore`]:
//!
//! - **Login**: exchanges credentials for a token and user profile
//! - **Logout**: best-effort server invalidation followed by a cleanup that
//!   runs on every exit path
//! - **Profile refresh**: re-reads the current user without touching the token
//!
//! It also derives the role-based [`Permissions`] the UI uses to show or
//! hide actions.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     ┌──────────────────┐
//! │   Front-end      │────▶│   AuthGateway    │
//! └──────────────────┘     └────────┬─────────┘
//!                                   │
//!                          ┌────────▼─────────┐
//!                          │ RequestPipeline  │──▶ SessionStore
//!                          └────────┬─────────┘
//!                                   │ HTTP
//!                          ┌────────▼─────────┐
//!                          │  project-flow    │
//!                          │  API server      │
//!                          └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pflow_auth::{AuthGateway, LoginRequest};
//! use pflow_client::RequestPipeline;
//!
//! # async fn example(pipeline: Arc<RequestPipeline>) -> Result<(), pflow_client::ApiError> {
//! let auth = AuthGateway::new(pipeline);
//!
//! let session = auth.login(&LoginRequest::new("alice", "secret")).await?;
//! println!("Logged in as {}", session.user.name);
//!
//! auth.logout().await?;
//! # Ok(())
//! # }
//! ```
//!
//! [`SessionStore`]: pflow_store::SessionStore

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod gateway;
pub mod permissions;

pub use gateway::{AuthGateway, ChangePasswordRequest, LoginRequest, LoginResponse};
pub use permissions::Permissions;

/// API paths used by the auth layer, relative to the API base URL.
pub mod endpoints {
    /// `POST` credentials, returns `{ token, user }`.
    pub const LOGIN: &str = "/login";
    /// `GET` the authenticated user's profile.
    pub const CURRENT_USER: &str = "/user/current";
    /// `POST` to invalidate the session server-side.
    pub const LOGOUT: &str = "/logout";
    /// `POST` `{ old_password, new_password }`.
    pub const CHANGE_PASSWORD: &str = "/user/change-password";
    /// `GET` the role catalogue.
    pub const ROLES: &str = "/roles";
}
