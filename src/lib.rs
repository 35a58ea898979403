//! Student records API library.

pub mod api;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;
pub mod students;

pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
