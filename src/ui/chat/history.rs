//! Transcript display component

use crate::config::UiConfig;
use crate::events::{ChatRole, ChatTurn};
use crate::format::markup_to_paragraphs;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};

/// Size of the transcript viewport as of the last render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub height: usize,
    pub total_lines: usize,
}

impl Viewport {
    fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height)
    }
}

/// Scroll position of the transcript, kept across renders
#[derive(Debug, Clone, Default)]
pub struct HistoryScroll {
    offset: usize,
    pending_latest: bool,
    viewport: Option<Viewport>,
}

impl HistoryScroll {
    /// Ask the next render to move the viewport to the end
    pub fn request_latest(&mut self) {
        self.pending_latest = true;
    }

    pub fn is_pending(&self) -> bool {
        self.pending_latest
    }

    /// Drop a request no render picked up
    pub fn discard_pending(&mut self) {
        self.pending_latest = false;
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.offset = self.offset.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        let max = self.viewport.map(|v| v.max_offset()).unwrap_or(0);
        self.offset = (self.offset + lines).min(max);
    }

    fn apply(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
        if self.pending_latest {
            self.offset = viewport.max_offset();
            self.pending_latest = false;
        }
        self.offset = self.offset.min(viewport.max_offset());
    }
}

/// Renders the turns of a conversation
pub struct ChatHistory<'a> {
    turns: &'a [ChatTurn],
    ui: &'a UiConfig,
}

impl<'a> ChatHistory<'a> {
    pub fn new(turns: &'a [ChatTurn], ui: &'a UiConfig) -> Self {
        Self { turns, ui }
    }

    /// Lay out every turn into display lines for the given width
    pub fn build_lines(&self, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for turn in self.turns {
            lines.extend(self.render_turn(turn, width));
            lines.push(Line::from(""));
        }
        lines
    }

    fn render_turn(&self, turn: &ChatTurn, width: u16) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let content_width = width.saturating_sub(2) as usize;

        let role_icon = match turn.role {
            ChatRole::User => "👤",
            ChatRole::Ai => "🤖",
        };
        let mut header = format!("{} {}", role_icon, turn.role.display_name());
        if self.ui.show_timestamps {
            header.push(' ');
            header.push_str(&turn.timestamp.format("%H:%M:%S").to_string());
        }
        lines.push(Line::from(Span::styled(
            header,
            Style::default().fg(Color::DarkGray),
        )));

        let paragraphs = match turn.role {
            ChatRole::Ai => markup_to_paragraphs(&turn.content),
            ChatRole::User => turn
                .content
                .split('\n')
                .map(|line| crate::format::DisplayParagraph {
                    text: line.to_string(),
                    is_error: false,
                })
                .collect(),
        };

        for paragraph in paragraphs {
            let style = if paragraph.is_error {
                Style::default().fg(Color::Red)
            } else {
                content_style(turn.role)
            };
            for wrapped in wrap_text(&paragraph.text, content_width) {
                lines.push(Line::from(vec![Span::raw("  "), Span::styled(wrapped, style)]));
            }
        }

        if self.ui.show_sources && !turn.sources.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(
                    "Sources:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                ),
            ]));
            for source in &turn.sources {
                let entry = match source.url() {
                    Some(url) if url != source.label() => format!("• {} ({})", source.label(), url),
                    _ => format!("• {}", source.label()),
                };
                for wrapped in wrap_text(&entry, content_width.saturating_sub(2)) {
                    lines.push(Line::from(vec![
                        Span::raw("    "),
                        Span::styled(wrapped, Style::default().fg(Color::Cyan)),
                    ]));
                }
            }
        }

        lines
    }
}

impl StatefulWidget for ChatHistory<'_> {
    type State = HistoryScroll;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut HistoryScroll) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 Documentation Assistant");

        let inner_area = block.inner(area);
        block.render(area, buf);

        if inner_area.height == 0 || inner_area.width == 0 {
            return;
        }

        let all_lines = self.build_lines(inner_area.width);
        state.apply(Viewport {
            height: inner_area.height as usize,
            total_lines: all_lines.len(),
        });

        let visible = all_lines
            .iter()
            .skip(state.offset)
            .take(inner_area.height as usize);
        for (i, line) in visible.enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if all_lines.len() > inner_area.height as usize {
            let mut scrollbar_state = ScrollbarState::new(all_lines.len()).position(state.offset);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(area, buf, &mut scrollbar_state);
        }
    }
}

/// Get content style based on role
fn content_style(role: ChatRole) -> Style {
    match role {
        ChatRole::User => Style::default().fg(Color::Blue),
        ChatRole::Ai => Style::default().fg(Color::Green),
    }
}

/// Split text into alternating runs of whitespace and non-whitespace
fn runs(text: &str) -> Vec<&str> {
    let mut runs = Vec::new();
    let mut start = 0;
    let mut in_space = None;

    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        if in_space.is_some_and(|prev| prev != is_space) {
            runs.push(&text[start..i]);
            start = i;
        }
        in_space = Some(is_space);
    }
    if start < text.len() {
        runs.push(&text[start..]);
    }
    runs
}

/// Wrap text to fit within the given width.
///
/// Breaks at whitespace where possible and splits words wider than the
/// line. Whitespace inside a line, indentation included, is kept.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for run in runs(text) {
        let run_width = run.chars().count();
        if current_width + run_width <= width {
            current_line.push_str(run);
            current_width += run_width;
            continue;
        }

        let is_space = run.starts_with(char::is_whitespace);
        if is_space && !current_line.is_empty() {
            // The break replaces the whitespace
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
            continue;
        }

        if !is_space && !current_line.is_empty() && run_width <= width {
            lines.push(current_line.trim_end().to_string());
            current_line = run.to_string();
            current_width = run_width;
            continue;
        }

        for c in run.chars() {
            if current_width == width {
                lines.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            current_line.push(c);
            current_width += 1;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Source;

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn quiet_ui() -> UiConfig {
        UiConfig {
            show_timestamps: false,
            show_sources: true,
        }
    }

    #[test]
    fn wrap_text_respects_width() {
        assert_eq!(
            wrap_text("one two three four", 9),
            vec!["one two", "three", "four"]
        );
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn wrap_text_splits_words_wider_than_the_line() {
        let url = "https://docs.example.com/spaces/payments/api/v2/refunds#request-body";
        let lines = wrap_text(&format!("See {}", url), 28);

        assert!(lines.iter().all(|line| line.chars().count() <= 28));
        assert_eq!(lines.concat(), format!("See {}", url));
    }

    #[test]
    fn wrap_text_keeps_indentation_and_inner_spacing() {
        assert_eq!(wrap_text("    indented code", 28), vec!["    indented code"]);
        assert_eq!(wrap_text("a  b", 10), vec!["a  b"]);
    }

    #[test]
    fn long_answers_are_not_cut_off() {
        let ui = quiet_ui();
        let answer = "See https://docs.example.com/spaces/payments/api/v2/refunds#request-body\n    indented code";
        let turns = vec![ChatTurn::ai(crate::format::format_text(answer), Vec::new())];
        let lines = ChatHistory::new(&turns, &ui).build_lines(30);
        let rendered: Vec<String> = lines.iter().map(line_text).collect();

        assert!(rendered.iter().all(|line| line.chars().count() <= 30));
        let joined: String = rendered
            .iter()
            .skip(1)
            .map(|line| line.strip_prefix("  ").unwrap_or(line))
            .collect();
        assert!(joined.contains("request-body"));
        assert!(rendered.iter().any(|line| line == "      indented code"));
    }

    #[test]
    fn assistant_markup_is_shown_as_plain_text() {
        let ui = quiet_ui();
        let turns = vec![ChatTurn::ai("<p>a &lt; b</p><p>done</p>", Vec::new())];
        let lines = ChatHistory::new(&turns, &ui).build_lines(40);
        let rendered: Vec<String> = lines.iter().map(line_text).collect();

        assert!(rendered.iter().any(|l| l.contains("a < b")));
        assert!(rendered.iter().any(|l| l.contains("done")));
        assert!(rendered.iter().all(|l| !l.contains("<p>")));
    }

    #[test]
    fn sources_are_listed_under_the_answer() {
        let ui = quiet_ui();
        let source: Source =
            serde_json::from_str(r#"{"id": "c1", "metadata": {"title": "Deploying", "url": "/docs/deploy"}}"#)
                .unwrap();
        let turns = vec![ChatTurn::ai("<p>See the guide.</p>", vec![source])];
        let rendered: Vec<String> = ChatHistory::new(&turns, &ui)
            .build_lines(60)
            .iter()
            .map(line_text)
            .collect();

        assert!(rendered.iter().any(|l| l.contains("Sources:")));
        assert!(rendered.iter().any(|l| l.contains("• Deploying (/docs/deploy)")));
    }

    #[test]
    fn sources_can_be_hidden() {
        let ui = UiConfig {
            show_timestamps: false,
            show_sources: false,
        };
        let turns = vec![ChatTurn::ai(
            "<p>x</p>",
            vec![Source::Reference("/docs".to_string())],
        )];
        let rendered: Vec<String> = ChatHistory::new(&turns, &ui)
            .build_lines(60)
            .iter()
            .map(line_text)
            .collect();
        assert!(rendered.iter().all(|l| !l.contains("Sources:")));
    }

    #[test]
    fn pending_request_scrolls_to_end_on_render() {
        let ui = quiet_ui();
        let turns: Vec<ChatTurn> = (0..10).map(|i| ChatTurn::user(format!("question {}", i))).collect();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        let mut scroll = HistoryScroll::default();

        scroll.request_latest();
        ChatHistory::new(&turns, &ui).render(area, &mut buf, &mut scroll);

        let viewport = scroll.viewport().unwrap();
        assert_eq!(viewport.height, 6);
        assert_eq!(scroll.offset(), viewport.total_lines - viewport.height);
        assert!(!scroll.is_pending());
        assert!(buffer_text(&buf).contains("question 9"));
    }

    #[test]
    fn without_request_the_view_stays_put() {
        let ui = quiet_ui();
        let turns: Vec<ChatTurn> = (0..10).map(|i| ChatTurn::user(format!("question {}", i))).collect();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        let mut scroll = HistoryScroll::default();

        ChatHistory::new(&turns, &ui).render(area, &mut buf, &mut scroll);

        assert_eq!(scroll.offset(), 0);
        assert!(buffer_text(&buf).contains("question 0"));
    }

    #[test]
    fn scrolling_is_clamped_to_content() {
        let ui = quiet_ui();
        let turns: Vec<ChatTurn> = (0..10).map(|i| ChatTurn::user(format!("q{}", i))).collect();
        let area = Rect::new(0, 0, 40, 8);
        let mut buf = Buffer::empty(area);
        let mut scroll = HistoryScroll::default();
        ChatHistory::new(&turns, &ui).render(area, &mut buf, &mut scroll);

        let max = scroll.viewport().unwrap().total_lines - 6;
        scroll.scroll_down(1000);
        assert_eq!(scroll.offset(), max);
        scroll.scroll_up(1000);
        assert_eq!(scroll.offset(), 0);
    }
}
