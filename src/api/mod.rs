//! Controller layer: validation + store calls folded into envelopes.

pub mod controller;
pub mod envelope;
pub mod error;

pub use controller::StudentController;
pub use envelope::Envelope;
pub use error::ApiError;
