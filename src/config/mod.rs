//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), optional
//!     → loader.rs (parse & deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → cloned into the HTTP server state
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Store credentials may come from SUPABASE_URL / SUPABASE_ANON_KEY
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::{
    ApiConfig, AppConfig, AuthConfig, ListenerConfig, LogFormat, ObservabilityConfig,
    StoreBackend, StoreConfig,
};
