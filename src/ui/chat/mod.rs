//! Chat UI components for the documentation assistant

pub mod commands;
pub mod composer;
pub mod controller;
pub mod history;

pub use commands::{SlashCommand, get_help_text, parse_slash_command};
pub use composer::{ChatComposer, ComposerResult};
pub use controller::{ChatAction, ChatController};
pub use history::{ChatHistory, HistoryScroll};
