//! HTTP API layer for scisync.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, research, comments, admin moderation
//! - **Extractors**: token authentication, admin-secret gating
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
