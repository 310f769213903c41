//! Domain types: entities, request-scoped models and API DTOs.

pub mod dto;
pub mod entities;
pub mod models;
