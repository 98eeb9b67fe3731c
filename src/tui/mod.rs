pub mod state;
pub mod ui;
pub mod widgets;

use crate::messages::UiMessage;
use crate::query::QueryVariant;
use crate::state::QueryState;
use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use state::AppState;
use std::io;
use tokio::sync::{mpsc, watch};

pub struct App {
    state: AppState,
    state_rx: watch::Receiver<QueryState>,
    ui_tx: mpsc::UnboundedSender<UiMessage>,
}

impl App {
    pub fn new(
        variant: QueryVariant,
        state_rx: watch::Receiver<QueryState>,
        ui_tx: mpsc::UnboundedSender<UiMessage>,
    ) -> Self {
        Self {
            state: AppState::new(variant),
            state_rx,
            ui_tx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_loop(&mut terminal).await;

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        loop {
            // Render UI
            terminal.draw(|f| ui::render(f, &self.state))?;

            // Handle events (non-blocking)
            if event::poll(std::time::Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(msg) = self.state.handle_key(key) {
                            let _ = self.ui_tx.send(msg);
                        }
                    }
                }
            }

            if self.state.should_quit {
                break;
            }

            // Pick up state transitions from the controller
            if self.state_rx.has_changed().unwrap_or(false) {
                let query_state = self.state_rx.borrow_and_update().clone();
                tracing::debug!("Rendering {} state", query_state.label());
                self.state.update(query_state);
            }

            // 60fps target
            tokio::time::sleep(std::time::Duration::from_millis(16)).await;
        }

        Ok(())
    }
}
