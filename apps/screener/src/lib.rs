//! Screener — client-side layer for the resume-review backend.
//!
//! Everything here talks to the REST API that owns parsing, scoring, and
//! persistence; this crate uploads, lists, watches analyses to completion,
//! and prepares interview scheduling. See `client` for the HTTP surface and
//! `watch` for the status-polling loop.

pub mod client;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod errors;
pub mod models;
pub mod render;
pub mod watch;

pub use client::ApiClient;
pub use config::Config;
pub use errors::ApiError;
