//! Student records domain.
//!
//! # Data Flow
//! ```text
//! raw JSON body (untrusted)
//!     → validation.rs (declarative field rules, all errors collected)
//!     → StudentInput (normalized: trimmed, email lowercased)
//!     → store (persisted as StudentRecord)
//! ```

pub mod model;
pub mod validation;

pub use model::{FieldError, StudentInput, StudentPatch, StudentRecord};
pub use validation::validate;
