use crate::error::LookupError;

/// Normalized lyrics from any supported provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricsResult {
    pub title: String,
    pub artist: String,
    pub lyrics_text: String,
    pub image_url: Option<String>,
}

/// The single value the presentation layer renders from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Loading,
    Success(LyricsResult),
    Failed(LookupError),
}

impl QueryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    /// `Success` and `Failed` are where every run ends up
    pub fn is_terminal(&self) -> bool {
        matches!(self, QueryState::Success(_) | QueryState::Failed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            QueryState::Idle => "idle",
            QueryState::Loading => "loading",
            QueryState::Success(_) => "success",
            QueryState::Failed(_) => "failed",
        }
    }
}

impl From<Result<LyricsResult, LookupError>> for QueryState {
    fn from(outcome: Result<LyricsResult, LookupError>) -> Self {
        match outcome {
            Ok(result) => QueryState::Success(result),
            Err(e) => QueryState::Failed(e),
        }
    }
}
