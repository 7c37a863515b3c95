//! Core types and capabilities for the project-flow client.
//!
//! This crate provides the foundational types shared by every client crate:
//!
//! - **Identity**: [`UserId`], [`Role`], [`User`] and the [`Session`] value
//! - **Role catalogue**: the role codes every permission decision is keyed on
//! - **Capabilities**: the [`Navigator`] and [`Notifier`] seams through which
//!   the session layer instructs the user interface
//!
//! # Example
//!
//! ```
//! use pflow_core::{roles, Role, Session, User, UserId};
//!
//! let user = User {
//!     id: UserId::new(7),
//!     name: "Alice".to_string(),
//!     role: Some(Role::new(roles::ADMIN, "Administrator")),
//!     ..User::default()
//! };
//!
//! let session = Session::new("abc", user);
//! assert!(session.is_authenticated());
//! assert_eq!(session.role_code(), "admin");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod nav;
pub mod roles;
pub mod session;

pub use ids::UserId;
pub use nav::{Navigator, Notifier};
pub use session::{Role, Session, User};

#[cfg(any(test, feature = "test-utils"))]
pub use nav::{RecordingNavigator, RecordingNotifier};
