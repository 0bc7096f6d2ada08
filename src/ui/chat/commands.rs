use std::str::FromStr;

use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Commands that can be invoked by starting a message with a leading slash.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "kebab-case")]
pub enum SlashCommand {
    /// Reset the transcript
    Clear,
    /// Show help
    Help,
    /// Exit the application
    Quit,
}

impl SlashCommand {
    /// User-visible description shown in help.
    pub fn description(self) -> &'static str {
        match self {
            SlashCommand::Clear => "clear the conversation history",
            SlashCommand::Help => "show available commands",
            SlashCommand::Quit => "exit the application",
        }
    }

    /// Command string without the leading '/'.
    pub fn command(self) -> &'static str {
        self.into()
    }
}

/// Parse a slash command from user input.
///
/// None of the commands take arguments, so input with anything after the
/// command word is a question, not a command.
pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let rest = input.trim().strip_prefix('/')?;

    let mut parts = rest.split_whitespace();
    let head = parts.next()?.to_lowercase();
    if parts.next().is_some() {
        return None;
    }

    SlashCommand::from_str(&head).ok().or_else(|| match head.as_str() {
        "q" | "exit" | "bye" => Some(SlashCommand::Quit),
        "reset" | "cls" => Some(SlashCommand::Clear),
        "h" | "?" => Some(SlashCommand::Help),
        _ => None,
    })
}

/// Get help text for all available commands
pub fn get_help_text() -> String {
    let mut help = String::from("Available commands:\n\n");
    for command in SlashCommand::iter() {
        help.push_str(&format!("/{} - {}\n", command.command(), command.description()));
    }

    help.push_str("\nEnter sends, Shift+Enter adds a line, PageUp/PageDown scroll.");
    help.push_str("\nCtrl+L clears the history, Ctrl+C quits.");

    help
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(parse_slash_command("/clear"), Some(SlashCommand::Clear));
        assert_eq!(parse_slash_command("  /HELP "), Some(SlashCommand::Help));
        assert_eq!(parse_slash_command("/q"), Some(SlashCommand::Quit));
    }

    #[test]
    fn trailing_words_make_it_a_question() {
        assert_eq!(parse_slash_command("/clear all of it"), None);
        assert_eq!(parse_slash_command("/help me find the API keys page"), None);
    }

    #[test]
    fn unknown_or_plain_text_is_not_a_command() {
        assert!(parse_slash_command("/api/ai/ask returns 500").is_none());
        assert!(parse_slash_command("how do I clear the cache?").is_none());
        assert!(parse_slash_command("/").is_none());
    }

    #[test]
    fn help_lists_every_command() {
        let help = get_help_text();
        for command in SlashCommand::iter() {
            assert!(help.contains(&format!("/{}", command.command())));
        }
    }
}
