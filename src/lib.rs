//! Credential and token security service for a bank card API.
//!
//! The heart of this crate is the token subsystem: nested signed-then-encrypted
//! JWTs (RS256 inside RSA-OAEP-256 + A256GCM) carrying identity claims, plus an
//! AES-GCM field cipher used by the persistence layer to keep card numbers
//! unreadable at rest. Everything else — the auth endpoints, the user store,
//! the request middleware — exists to consume those two pieces.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   HTTP Routes   │ ← /api/auth/*, /api/me
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Middlewares   │ ← bearer token → principal (never rejects)
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    Services     │ ← JwtService, AuthService, FieldCipher
//! └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  Repositories   │ ← user store (external collaborator seam)
//! └─────────────────┘
//! ```
//!
//! All keys (two RSA pairs, one AES key) are loaded once at startup and held
//! immutably by explicitly constructed services; a missing or malformed key is
//! fatal and the process refuses to start.

pub mod config;
pub mod core;
pub mod domain;
pub mod handlers;
pub mod middlewares;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod utils;
