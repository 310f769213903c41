//! Application-wide core types.

pub mod errors;

pub use errors::{AppError, AppResult};
