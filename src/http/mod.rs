//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, CORS headers)
//!     → auth.rs (optional bearer gate)
//!     → routes.rs (method + last path segment → Route)
//!     → api::StudentController (validation, store calls)
//!     → response.rs (envelope → JSON + status)
//!     → Send to client
//! ```

pub mod auth;
pub mod response;
pub mod routes;
pub mod server;

pub use routes::{Route, StudentAction};
pub use server::{AppState, HttpServer, X_REQUEST_ID};
