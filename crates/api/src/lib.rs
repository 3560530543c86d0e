//! HTTP API layer for maru.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: contents, topics, reactions, groups, users, media, login
//! - **Extractors**: cookie-token authentication
//! - **Middleware**: auth, logging
//!
//! Built on Axum 0.8 with the Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
