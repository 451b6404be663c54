//! Document-chat client state.
//!
//! SYSTEM CONTEXT
//! ==============
//! A thin client over a remote chat API: per-user session ids persisted in a
//! local key-value store, a message exchange controller that tracks the
//! lifecycle of sends and uploads and keeps a per-session history cache
//! consistent with the server, plus the small pieces of widget state around
//! them (draft text, file selection, tutorial, connectivity).

pub mod config;
pub mod net;
pub mod notify;
pub mod state;
pub mod storage;
pub mod widget;

pub use config::ClientConfig;
pub use net::api::{ChatApi, HttpChatApi};
pub use net::types::{ChatError, Message, UploadFile, User};
pub use widget::ChatWidget;
