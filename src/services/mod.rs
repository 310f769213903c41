//! Business logic layer.

pub mod auth;
pub mod crypto;
