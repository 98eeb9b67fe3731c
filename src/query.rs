use crate::error::ValidationError;
use std::fmt;

/// Raw user input captured at submission time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub artist_name: Option<String>,
    pub song_title: Option<String>,
    pub free_text: Option<String>,
}

impl Query {
    pub fn artist_song(artist: impl Into<String>, song: impl Into<String>) -> Self {
        Self {
            artist_name: Some(artist.into()),
            song_title: Some(song.into()),
            free_text: None,
        }
    }

    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            artist_name: None,
            song_title: None,
            free_text: Some(text.into()),
        }
    }
}

/// Which input fields the configured endpoint needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryVariant {
    ArtistSong,
    FreeText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Artist,
    Song,
    Query,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Artist => "artist",
            Field::Song => "song",
            Field::Query => "search",
        };
        f.write_str(name)
    }
}

/// A query whose required fields are present and trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidQuery {
    ArtistSong { artist: String, song: String },
    FreeText { text: String },
}

impl ValidQuery {
    /// Title to report when the upstream response does not carry one
    pub fn echoed_title(&self) -> &str {
        match self {
            ValidQuery::ArtistSong { song, .. } => song,
            ValidQuery::FreeText { text } => text,
        }
    }

    /// Artist to report when the upstream response does not carry one
    pub fn echoed_artist(&self) -> &str {
        match self {
            ValidQuery::ArtistSong { artist, .. } => artist,
            ValidQuery::FreeText { .. } => "",
        }
    }
}

impl fmt::Display for ValidQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidQuery::ArtistSong { artist, song } => write!(f, "{} - {}", artist, song),
            ValidQuery::FreeText { text } => write!(f, "\"{}\"", text),
        }
    }
}

fn required(value: Option<&String>, field: Field) -> Result<String, ValidationError> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ValidationError::EmptyField(field)),
    }
}

/// Check the fields the variant requires. Fields are reported in form order,
/// so an empty artist wins over an empty song.
pub fn validate(query: &Query, variant: QueryVariant) -> Result<ValidQuery, ValidationError> {
    match variant {
        QueryVariant::ArtistSong => {
            let artist = required(query.artist_name.as_ref(), Field::Artist)?;
            let song = required(query.song_title.as_ref(), Field::Song)?;
            Ok(ValidQuery::ArtistSong { artist, song })
        }
        QueryVariant::FreeText => {
            let text = required(query.free_text.as_ref(), Field::Query)?;
            Ok(ValidQuery::FreeText { text })
        }
    }
}
