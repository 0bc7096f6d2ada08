use crate::client::{AskBackend, AskResponse};
use crate::config::UiConfig;
use crate::error::AskError;
use crate::events::ChatTurn;
use crate::format::{error_markup, format_text};
use crate::ui::chat::{
    ChatComposer, ChatHistory, ComposerResult, HistoryScroll, SlashCommand,
    get_help_text, parse_slash_command,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};
use tracing::{debug, error, info};

pub const WELCOME_MESSAGE: &str = "<p>Hello! Ask me anything about our documentation.</p>";
pub const CLEARED_MESSAGE: &str = "<p>History cleared. How can I help you now?</p>";

const PAGE_LINES: usize = 10;

/// Actions the event loop must carry out for the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatAction {
    None,
    /// Send this query to the backend and report back through `finish_query`
    Ask(String),
    Exit,
}

/// Holds the transcript and the input field, and drives one request at a time
pub struct ChatController {
    turns: Vec<ChatTurn>,
    composer: ChatComposer,
    scroll: HistoryScroll,
    ui: UiConfig,
    is_loading: bool,
}

impl ChatController {
    pub fn new(ui: UiConfig) -> Self {
        Self {
            turns: Vec::new(),
            composer: ChatComposer::new("Ask anything about the documentation..."),
            scroll: HistoryScroll::default(),
            ui,
            is_loading: false,
        }
    }

    /// Seed the transcript with the welcome turn
    pub fn initialize(&mut self) {
        self.turns = vec![ChatTurn::ai(WELCOME_MESSAGE, Vec::new())];
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn input(&self) -> &str {
        self.composer.content()
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.composer.set_content(text);
    }

    pub fn scroll(&self) -> &HistoryScroll {
        &self.scroll
    }

    /// Take the input field as a query.
    ///
    /// Returns `None` without touching anything when the input is blank or a
    /// request is already in flight. Otherwise records the user turn, clears
    /// the field and marks a request as in flight.
    pub fn begin_query(&mut self) -> Option<String> {
        let query = self.composer.content().trim().to_string();
        if query.is_empty() || self.is_loading {
            return None;
        }

        self.turns.push(ChatTurn::user(query.clone()));
        self.composer.clear();
        self.set_loading(true);
        self.scroll_to_latest();

        debug!(query = %query, "submitting query");
        Some(query)
    }

    /// Record the outcome of the request started by `begin_query`
    pub fn finish_query(&mut self, result: Result<AskResponse, AskError>) {
        match result {
            Ok(response) => {
                info!(sources = response.sources.as_ref().map_or(0, Vec::len), "answer received");
                let content = format_text(response.answer());
                self.turns.push(ChatTurn::ai(content, response.into_sources()));
            }
            Err(e) => {
                error!(error = %e, "error fetching assistant response");
                self.turns
                    .push(ChatTurn::ai(error_markup(&e.user_message()), Vec::new()));
            }
        }

        self.set_loading(false);
        self.scroll_to_latest();
    }

    /// Submit the input field and wait for the answer.
    ///
    /// Returns whether a request was issued.
    pub async fn submit_query<B: AskBackend + ?Sized>(&mut self, backend: &B) -> bool {
        let Some(query) = self.begin_query() else {
            return false;
        };

        let result = backend.ask(&query).await;
        self.finish_query(result);
        true
    }

    /// Replace the transcript with the reset turn
    pub fn clear_history(&mut self) {
        self.turns = vec![ChatTurn::ai(CLEARED_MESSAGE, Vec::new())];
        self.scroll = HistoryScroll::default();
    }

    /// Move the transcript to its end on the next render
    pub fn scroll_to_latest(&mut self) {
        self.scroll.request_latest();
    }

    /// Called after each draw. A scroll request that no render picked up had
    /// no transcript to act on and is dropped.
    pub fn after_render(&mut self) {
        if self.scroll.is_pending() {
            self.scroll.discard_pending();
        }
    }

    fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
        self.composer.set_waiting(loading);
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ChatAction {
        if key.kind != KeyEventKind::Press {
            return ChatAction::None;
        }

        // AltGr arrives as Control+Alt on some terminals and must still type
        let is_chord = key.modifiers.contains(KeyModifiers::CONTROL)
            && !key.modifiers.contains(KeyModifiers::ALT);
        if is_chord {
            match key.code {
                KeyCode::Char('c') => return ChatAction::Exit,
                KeyCode::Char('l') => {
                    self.clear_history();
                    return ChatAction::None;
                }
                KeyCode::Char(_) => return ChatAction::None,
                _ => {}
            }
        }

        match key.code {
            KeyCode::PageUp => {
                self.scroll.scroll_up(PAGE_LINES);
                ChatAction::None
            }
            KeyCode::PageDown => {
                self.scroll.scroll_down(PAGE_LINES);
                ChatAction::None
            }
            _ => match self.composer.handle_key(key) {
                ComposerResult::Submit => self.submit_input(),
                ComposerResult::None => ChatAction::None,
            },
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
    }

    fn submit_input(&mut self) -> ChatAction {
        if let Some(command) = parse_slash_command(self.composer.content()) {
            self.composer.clear();
            return self.handle_slash_command(command);
        }

        match self.begin_query() {
            Some(query) => ChatAction::Ask(query),
            None => ChatAction::None,
        }
    }

    /// Handle slash commands
    fn handle_slash_command(&mut self, command: SlashCommand) -> ChatAction {
        match command {
            SlashCommand::Clear => {
                self.clear_history();
                ChatAction::None
            }
            SlashCommand::Help => {
                self.turns
                    .push(ChatTurn::ai(format_text(&get_help_text()), Vec::new()));
                self.scroll_to_latest();
                ChatAction::None
            }
            SlashCommand::Quit => ChatAction::Exit,
        }
    }

    /// Render the chat: transcript on top, composer at the bottom
    pub fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // History area
                Constraint::Length(4), // Composer area
            ])
            .split(frame.size());

        frame.render_stateful_widget(
            ChatHistory::new(&self.turns, &self.ui),
            chunks[0],
            &mut self.scroll,
        );
        frame.render_widget(&self.composer, chunks[1]);
    }
}
