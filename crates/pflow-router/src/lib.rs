//! Role-based navigation for the project-flow client.
//!
//! Every navigation attempt is resolved against a [`RouteTable`] and
//! admitted or redirected by the [`RouteGuard`] before the [`Navigator`] is
//! told where to go:
//!
//! ```text
//!   navigate("/logs")
//!         │
//!   ┌─────▼──────┐   redirect    ┌────────────┐
//!   │ RouteTable │──────────────▶│ next path  │──┐
//!   └─────┬──────┘               └────────────┘  │
//!         │ page + meta                ▲         │
//!   ┌─────▼──────┐   redirect          │         │
//!   │ RouteGuard │─────────────────────┘         │
//!   └─────┬──────┘        (bounded hops) ◀───────┘
//!         │ allow
//!   ┌─────▼──────┐
//!   │ Navigator  │  go_to(final path), once
//!   └────────────┘
//! ```
//!
//! The guard is synchronous and reads the [`SessionStore`] once per
//! navigation; it never performs I/O and never fails.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pflow_core::Navigator;
//! use pflow_router::{RouteGuard, RouteTable, Router};
//! use pflow_store::SessionStore;
//!
//! # fn example(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) {
//! let router = Router::new(RouteTable::standard(), RouteGuard::default(), session, navigator);
//! let navigation = router.navigate("/projects/42");
//! println!("now at {}", navigation.path);
//! # }
//! ```
//!
//! [`Navigator`]: pflow_core::Navigator
//! [`SessionStore`]: pflow_store::SessionStore

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod guard;
pub mod navigation;
pub mod route;

pub use guard::{Decision, RouteGuard};
pub use navigation::{Navigation, Router, MAX_REDIRECTS};
pub use route::{normalize, Resolution, Route, RouteKind, RouteMatch, RouteMeta, RouteTable};
