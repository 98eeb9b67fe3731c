use crate::error::ParseError;
use crate::query::ValidQuery;
use crate::state::LyricsResult;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// `{ "lyrics": "..." }`, as served by lyrics.ovh
#[derive(Debug, Deserialize)]
pub struct PlainResponse {
    pub lyrics: Option<String>,
}

/// `{ "type": "exact", "art": {...}, "mus": [...] }`, as served by Vagalume
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub art: Option<SearchArtist>,
    #[serde(default)]
    pub mus: Vec<SearchSong>,
}

#[derive(Debug, Deserialize)]
pub struct SearchArtist {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchSong {
    pub name: Option<String>,
    pub text: Option<String>,
}

/// `{ "status": 200, "result": { "title", "artist", "lyrics", "image" } }`
#[derive(Debug, Deserialize)]
pub struct WrappedResponse {
    pub status: i64,
    #[serde(default)]
    pub result: Option<WrappedResult>,
}

#[derive(Debug, Deserialize)]
pub struct WrappedResult {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub lyrics: Option<String>,
    pub image: Option<String>,
}

/// The upstream payload shapes we know how to read
#[derive(Debug)]
pub enum ResponseShape {
    Plain(PlainResponse),
    Search(SearchResponse),
    Wrapped(WrappedResponse),
}

const SEARCH_MATCH_TYPES: &[&str] = &["exact", "aprox"];

fn typed<T: DeserializeOwned>(value: Value) -> Result<T, ParseError> {
    serde_json::from_value(value).map_err(|e| ParseError::MalformedJson(e.to_string()))
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

impl ResponseShape {
    /// Pick the shape from the keys present in the document. Returns `None`
    /// for valid JSON that matches none of them.
    pub fn detect(value: Value) -> Result<Option<Self>, ParseError> {
        let Some(object) = value.as_object() else {
            return Ok(None);
        };

        let shape = if object.contains_key("status") && object.contains_key("result") {
            ResponseShape::Wrapped(typed(value)?)
        } else if object.contains_key("type") {
            ResponseShape::Search(typed(value)?)
        } else if object.contains_key("lyrics") {
            ResponseShape::Plain(typed(value)?)
        } else {
            return Ok(None);
        };

        Ok(Some(shape))
    }

    /// Normalize into a `LyricsResult`, echoing the query where the provider
    /// omits title or artist
    pub fn into_result(self, query: &ValidQuery) -> Result<LyricsResult, ParseError> {
        let echo = |value: Option<String>, fallback: &str| {
            non_empty(value).unwrap_or_else(|| fallback.to_string())
        };

        match self {
            ResponseShape::Plain(plain) => {
                let lyrics_text = non_empty(plain.lyrics).ok_or(ParseError::NotFound)?;
                Ok(LyricsResult {
                    title: query.echoed_title().to_string(),
                    artist: query.echoed_artist().to_string(),
                    lyrics_text,
                    image_url: None,
                })
            }
            ResponseShape::Search(search) => {
                if !SEARCH_MATCH_TYPES.contains(&search.kind.as_str()) {
                    tracing::debug!("Search response type '{}' is not a match", search.kind);
                    return Err(ParseError::NotFound);
                }
                let song = search.mus.into_iter().next().ok_or(ParseError::NotFound)?;
                let lyrics_text = non_empty(song.text).ok_or(ParseError::NotFound)?;
                Ok(LyricsResult {
                    title: echo(song.name, query.echoed_title()),
                    artist: echo(search.art.and_then(|a| a.name), query.echoed_artist()),
                    lyrics_text,
                    image_url: None,
                })
            }
            ResponseShape::Wrapped(wrapped) => {
                if wrapped.status != 200 {
                    tracing::debug!("Wrapped response status {} is not a match", wrapped.status);
                    return Err(ParseError::NotFound);
                }
                let result = wrapped.result.ok_or(ParseError::NotFound)?;
                let lyrics_text = non_empty(result.lyrics).ok_or(ParseError::NotFound)?;
                Ok(LyricsResult {
                    title: echo(result.title, query.echoed_title()),
                    artist: echo(result.artist, query.echoed_artist()),
                    lyrics_text,
                    image_url: non_empty(result.image),
                })
            }
        }
    }
}

/// Decode a response body into lyrics
pub fn parse_response(body: &str, query: &ValidQuery) -> Result<LyricsResult, ParseError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ParseError::MalformedJson(e.to_string()))?;

    match ResponseShape::detect(value)? {
        Some(shape) => shape.into_result(query),
        None => {
            tracing::debug!("Response matches no known shape");
            Err(ParseError::NotFound)
        }
    }
}
