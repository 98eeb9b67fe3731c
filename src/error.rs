use crate::query::Field;
use thiserror::Error;

/// Input rejected before any request is built
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in the {0} field")]
    EmptyField(Field),
}

/// The lookup request never produced a usable 2xx response
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Could not reach the lyrics service: {0}")]
    NetworkFailure(String),

    #[error("Lyrics service answered with HTTP {0}")]
    HttpStatus(u16),
}

/// A 2xx response that could not be turned into lyrics
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Lyrics service sent an unreadable response: {0}")]
    MalformedJson(String),

    #[error("No lyrics found")]
    NotFound,
}

/// Every way a single lookup can fail. The `Display` output is what the
/// presentation layer shows to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::Parse(ParseError::NotFound))
    }
}

/// Problems with the endpoint template or the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid endpoint template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Endpoint template uses {{apikey}} but no API key is configured")]
    MissingApiKey,

    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Json {
        path: std::path::PathBuf,
        source: serde_json::Error,
    },
}
