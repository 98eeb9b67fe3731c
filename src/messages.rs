use crate::query::Query;

/// Messages sent from TUI to Worker
#[derive(Debug, Clone)]
pub enum UiMessage {
    Submit(Query),
    Quit,
}
