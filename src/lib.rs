pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod messages;
pub mod paths;
pub mod query;
pub mod state;
pub mod tui;
pub mod worker;

pub use controller::LyricsQueryController;
pub use query::Query;
pub use state::{LyricsResult, QueryState};
