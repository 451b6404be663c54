//! Networking modules for the chat REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` handles REST calls and `types` defines the shared wire schema and
//! error taxonomy.

pub mod api;
pub mod types;
