//! Shared utilities.

pub mod pem;
