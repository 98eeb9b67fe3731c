use crate::state::QueryState;
use crate::tui::{
    state::AppState,
    widgets::{InputBox, LyricsPanel},
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the TUI (Elm Architecture - View)
pub fn render(frame: &mut Frame, state: &AppState) {
    // Clear the frame to prevent ghost characters
    frame.render_widget(
        Block::default().style(Style::default().bg(Color::Reset)),
        frame.area(),
    );

    let fields = state.fields();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                        // Header
            Constraint::Length(3 * fields.len() as u16), // Form
            Constraint::Min(5),                           // Lyrics (responsive)
            Constraint::Length(3),                        // Footer
        ])
        .split(frame.area());

    render_header(frame, chunks[0], state);
    render_form(frame, chunks[1], state);
    LyricsPanel::new(&state.query_state, state.scroll_offset).render(frame, chunks[2]);
    render_footer(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let (title, color) = match &state.query_state {
        QueryState::Idle => ("lyricfind - Lyrics Finder", Color::Cyan),
        QueryState::Loading => ("lyricfind - Searching...", Color::Yellow),
        QueryState::Success(_) => ("lyricfind - Found ✓", Color::Green),
        QueryState::Failed(_) => ("lyricfind - Failed ✗", Color::Red),
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(header, area);
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let fields = state.fields();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(3); fields.len()])
        .split(area);

    for (field, row) in fields.iter().zip(rows.iter()) {
        InputBox::new(field.label(), state.value(*field), state.focus == *field)
            .render(frame, *row);
    }
}

fn render_footer(frame: &mut Frame, area: Rect) {
    let key = |k: &'static str| {
        Span::styled(
            k,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    };

    let spans = vec![
        key("Enter"),
        Span::raw(" Find | "),
        key("Tab"),
        Span::raw(" Next field | "),
        key("↑↓"),
        Span::raw(" Scroll | "),
        key("Ctrl+U"),
        Span::raw(" Clear | "),
        key("Esc"),
        Span::raw(" Quit"),
    ];

    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));

    frame.render_widget(footer, area);
}
