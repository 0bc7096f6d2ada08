//! Terminal chat client for a documentation site's AI assistant.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod format;
pub mod logging;
pub mod tui;
pub mod ui;
