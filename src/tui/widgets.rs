use crate::state::{LyricsResult, QueryState};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Single-line text input with a cursor marker when focused
pub struct InputBox<'a> {
    label: &'a str,
    value: &'a str,
    focused: bool,
}

impl<'a> InputBox<'a> {
    pub fn new(label: &'a str, value: &'a str, focused: bool) -> Self {
        Self {
            label,
            value,
            focused,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let border_style = if self.focused {
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(self.label);

        // Keep the tail of long input visible
        let inner_width = area.width.saturating_sub(3) as usize;
        let chars: Vec<char> = self.value.chars().collect();
        let visible: String = chars[chars.len().saturating_sub(inner_width)..]
            .iter()
            .collect();

        let mut spans = vec![Span::raw(visible)];
        if self.focused {
            spans.push(Span::styled("▏", Style::default().fg(Color::Blue)));
        } else if self.value.is_empty() {
            spans.push(Span::styled(
                self.label,
                Style::default().fg(Color::DarkGray),
            ));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}

/// Lyrics, progress or error text for the current lookup
pub struct LyricsPanel<'a> {
    state: &'a QueryState,
    scroll: u16,
}

impl<'a> LyricsPanel<'a> {
    pub fn new(state: &'a QueryState, scroll: u16) -> Self {
        Self { state, scroll }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Lyrics");

        let text = match self.state {
            QueryState::Idle => Text::styled(
                "Fill in the form and press Enter to find lyrics",
                Style::default().fg(Color::DarkGray),
            ),
            QueryState::Loading => Text::styled(
                "Searching...",
                Style::default().fg(Color::Yellow),
            ),
            QueryState::Success(result) => Self::lyrics_text(result),
            QueryState::Failed(error) => Text::styled(
                error.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        };

        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0));

        frame.render_widget(paragraph, area);
    }

    /// Unwrapped line count of what `render` shows for `state`
    pub fn line_count(state: &QueryState) -> u16 {
        match state {
            QueryState::Success(result) => {
                u16::try_from(Self::lyrics_text(result).lines.len()).unwrap_or(u16::MAX)
            }
            _ => 1,
        }
    }

    fn lyrics_text(result: &LyricsResult) -> Text<'static> {
        let heading = if result.artist.is_empty() {
            result.title.clone()
        } else {
            format!("{} - {}", result.artist, result.title)
        };

        let mut lines = vec![Line::styled(
            heading,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )];
        if let Some(image_url) = &result.image_url {
            lines.push(Line::styled(
                image_url.clone(),
                Style::default().fg(Color::DarkGray),
            ));
        }
        lines.push(Line::default());
        lines.extend(
            result
                .lyrics_text
                .lines()
                .map(|line| Line::raw(line.to_string())),
        );

        Text::from(lines)
    }
}
