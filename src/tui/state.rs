use crate::messages::UiMessage;
use crate::query::{Query, QueryVariant};
use crate::state::QueryState;
use crate::tui::widgets::LyricsPanel;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE_LINES: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputField {
    Artist,
    Song,
    Search,
}

impl InputField {
    pub fn label(&self) -> &'static str {
        match self {
            InputField::Artist => "Artist",
            InputField::Song => "Song",
            InputField::Search => "Search",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub variant: QueryVariant,
    pub artist: String,
    pub song: String,
    pub search: String,
    pub focus: InputField,
    pub query_state: QueryState,
    pub scroll_offset: u16,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(variant: QueryVariant) -> Self {
        let focus = match variant {
            QueryVariant::ArtistSong => InputField::Artist,
            QueryVariant::FreeText => InputField::Search,
        };
        Self {
            variant,
            artist: String::new(),
            song: String::new(),
            search: String::new(),
            focus,
            query_state: QueryState::Idle,
            scroll_offset: 0,
            should_quit: false,
        }
    }

    /// Replace the rendered lookup state (Elm Architecture - Update)
    pub fn update(&mut self, query_state: QueryState) {
        if query_state != self.query_state {
            self.scroll_offset = 0;
        }
        self.query_state = query_state;
    }

    /// Input fields shown for the configured endpoint, in tab order
    pub fn fields(&self) -> &'static [InputField] {
        match self.variant {
            QueryVariant::ArtistSong => &[InputField::Artist, InputField::Song],
            QueryVariant::FreeText => &[InputField::Search],
        }
    }

    pub fn value(&self, field: InputField) -> &str {
        match field {
            InputField::Artist => &self.artist,
            InputField::Song => &self.song,
            InputField::Search => &self.search,
        }
    }

    fn value_mut(&mut self, field: InputField) -> &mut String {
        match field {
            InputField::Artist => &mut self.artist,
            InputField::Song => &mut self.song,
            InputField::Search => &mut self.search,
        }
    }

    /// Furthest scroll that still leaves the last line on screen
    fn max_scroll(&self) -> u16 {
        LyricsPanel::line_count(&self.query_state).saturating_sub(1)
    }

    fn scroll_by(&mut self, lines: i32) {
        let offset = (i32::from(self.scroll_offset) + lines).clamp(0, i32::from(self.max_scroll()));
        self.scroll_offset = offset as u16;
    }

    fn cycle_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let index = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (index + 1) % fields.len()
        } else {
            (index + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    /// Snapshot the form as a query
    pub fn query(&self) -> Query {
        match self.variant {
            QueryVariant::ArtistSong => Query::artist_song(&self.artist, &self.song),
            QueryVariant::FreeText => Query::free_text(&self.search),
        }
    }

    /// Apply a key press. Returns the message to send to the worker, if any.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<UiMessage> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.should_quit = true;
                Some(UiMessage::Quit)
            }
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                Some(UiMessage::Quit)
            }
            KeyCode::Char('u') if ctrl => {
                self.value_mut(self.focus).clear();
                None
            }
            KeyCode::Enter => Some(UiMessage::Submit(self.query())),
            KeyCode::Tab => {
                self.cycle_focus(true);
                None
            }
            KeyCode::BackTab => {
                self.cycle_focus(false);
                None
            }
            KeyCode::Backspace => {
                self.value_mut(self.focus).pop();
                None
            }
            KeyCode::Char(c) if !ctrl => {
                self.value_mut(self.focus).push(c);
                None
            }
            KeyCode::Up => {
                self.scroll_by(-1);
                None
            }
            KeyCode::Down => {
                self.scroll_by(1);
                None
            }
            KeyCode::PageUp => {
                self.scroll_by(-PAGE_LINES);
                None
            }
            KeyCode::PageDown => {
                self.scroll_by(PAGE_LINES);
                None
            }
            _ => None,
        }
    }
}
