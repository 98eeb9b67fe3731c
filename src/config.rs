use crate::error::ConfigError;
use crate::query::{QueryVariant, ValidQuery};
use serde::Deserialize;
use std::path::Path;

pub const ENDPOINT_ENV: &str = "LYRICFIND_ENDPOINT";
pub const API_KEY_ENV: &str = "LYRICFIND_API_KEY";

/// Built-in endpoint templates, selectable by name
pub const PRESETS: &[(&str, &str)] = &[
    (
        "vagalume",
        "https://api.vagalume.com.br/search.php?art={artist}&mus={song}&apikey={apikey}",
    ),
    ("lyrics-ovh", "https://api.lyrics.ovh/v1/{artist}/{song}"),
];

const DEFAULT_PRESET: &str = "lyrics-ovh";

const PLACEHOLDERS: &[&str] = &["artist", "song", "query", "apikey"];

/// A validated GET URL template with `{artist}`, `{song}`, `{query}` and
/// `{apikey}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTemplate {
    template: String,
    variant: QueryVariant,
    uses_api_key: bool,
}

impl EndpointTemplate {
    /// Accept either a preset name or a literal template
    pub fn resolve(name_or_template: &str) -> Result<Self, ConfigError> {
        let trimmed = name_or_template.trim();
        let template = PRESETS
            .iter()
            .find(|(name, _)| *name == trimmed)
            .map(|(_, template)| *template)
            .unwrap_or(trimmed);
        Self::parse(template)
    }

    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if !(template.starts_with("https://") || template.starts_with("http://")) {
            return Err(invalid("must start with http:// or https://"));
        }

        let mut found = Vec::new();
        let mut rest = template;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| invalid("unterminated '{'"))?;
            let name = &after[..close];
            if !PLACEHOLDERS.iter().any(|p| *p == name) {
                return Err(invalid(&format!("unknown placeholder {{{}}}", name)));
            }
            found.push(name);
            rest = &after[close + 1..];
        }

        let has = |name: &str| found.iter().any(|f| *f == name);
        let variant = match (has("query"), has("artist"), has("song")) {
            (true, false, false) => QueryVariant::FreeText,
            (true, _, _) => {
                return Err(invalid("cannot mix {query} with {artist}/{song}"));
            }
            (false, true, true) => QueryVariant::ArtistSong,
            (false, _, _) => {
                return Err(invalid("needs {query} or both {artist} and {song}"));
            }
        };

        Ok(Self {
            template: template.to_string(),
            variant,
            uses_api_key: has("apikey"),
        })
    }

    pub fn variant(&self) -> QueryVariant {
        self.variant
    }

    pub fn uses_api_key(&self) -> bool {
        self.uses_api_key
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Interpolate percent-encoded values into the template
    pub fn render(&self, query: &ValidQuery, api_key: &str) -> String {
        let mut url = self.template.replace("{apikey}", &urlencoding::encode(api_key));
        match query {
            ValidQuery::ArtistSong { artist, song } => {
                url = url
                    .replace("{artist}", &urlencoding::encode(artist))
                    .replace("{song}", &urlencoding::encode(song));
            }
            ValidQuery::FreeText { text } => {
                url = url.replace("{query}", &urlencoding::encode(text));
            }
        }
        url
    }
}

impl Default for EndpointTemplate {
    fn default() -> Self {
        Self::resolve(DEFAULT_PRESET).expect("default preset is a valid template")
    }
}

/// What to do with a submission that arrives while a lookup is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Drop the new submission; the first request wins
    #[default]
    IgnoreWhileLoading,
    /// Start the new request and discard the older one's outcome
    Supersede,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub endpoint: EndpointTemplate,
    pub api_key: Option<String>,
    pub submit_policy: SubmitPolicy,
}

/// One source of settings. Unset fields leave lower layers untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub supersede: Option<bool>,
}

impl ConfigLayer {
    /// Read a JSON config file. A missing file is not an error.
    pub fn from_file(path: &Path) -> Result<Option<Self>, ConfigError> {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}", path.display());
                return Ok(None);
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let layer = serde_json::from_str(&json).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded config file: {}", path.display());
        Ok(Some(layer))
    }

    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            endpoint: non_empty(ENDPOINT_ENV),
            api_key: non_empty(API_KEY_ENV),
            supersede: None,
        }
    }
}

impl Config {
    /// Fold layers from lowest to highest precedence onto the defaults
    pub fn from_layers(layers: impl IntoIterator<Item = ConfigLayer>) -> Result<Self, ConfigError> {
        let mut endpoint = None;
        let mut api_key = None;
        let mut supersede = false;

        for layer in layers {
            if layer.endpoint.is_some() {
                endpoint = layer.endpoint;
            }
            if layer.api_key.is_some() {
                api_key = layer.api_key;
            }
            if let Some(value) = layer.supersede {
                supersede = value;
            }
        }

        let endpoint = match endpoint {
            Some(value) => EndpointTemplate::resolve(&value)?,
            None => EndpointTemplate::default(),
        };

        if endpoint.uses_api_key() && api_key.is_none() {
            return Err(ConfigError::MissingApiKey);
        }

        Ok(Self {
            endpoint,
            api_key,
            submit_policy: if supersede {
                SubmitPolicy::Supersede
            } else {
                SubmitPolicy::IgnoreWhileLoading
            },
        })
    }

    /// Defaults, then the config file, then the environment, then the CLI
    pub fn load(config_path: Option<&Path>, cli: ConfigLayer) -> Result<Self, ConfigError> {
        let mut layers = Vec::new();
        if let Some(path) = config_path {
            if let Some(layer) = ConfigLayer::from_file(path)? {
                layers.push(layer);
            }
        }
        layers.push(ConfigLayer::from_env());
        layers.push(cli);

        let config = Self::from_layers(layers)?;
        tracing::debug!(
            "Using endpoint {} ({:?}, policy {:?})",
            config.endpoint.as_str(),
            config.variant(),
            config.submit_policy
        );
        Ok(config)
    }

    pub fn variant(&self) -> QueryVariant {
        self.endpoint.variant()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_presets_are_valid() {
        for (name, _) in PRESETS {
            let template = EndpointTemplate::resolve(name).unwrap();
            assert_eq!(template.variant(), QueryVariant::ArtistSong);
        }
        assert!(EndpointTemplate::resolve("vagalume").unwrap().uses_api_key());
        assert!(!EndpointTemplate::default().uses_api_key());
    }

    #[test]
    fn test_parse_free_text_template() {
        let template = EndpointTemplate::parse("https://example.com/search?q={query}").unwrap();
        assert_eq!(template.variant(), QueryVariant::FreeText);
        assert!(!template.uses_api_key());
    }

    #[test]
    fn test_parse_rejects_bad_templates() {
        let bad = [
            "ftp://example.com/{query}",
            "https://example.com/{artist}",
            "https://example.com/{query}/{artist}",
            "https://example.com/{query}?key={token}",
            "https://example.com/{query",
            "https://example.com/static",
        ];
        for template in bad {
            assert!(
                matches!(
                    EndpointTemplate::parse(template),
                    Err(ConfigError::InvalidTemplate { .. })
                ),
                "accepted {}",
                template
            );
        }
    }

    #[test]
    fn test_render_percent_encodes_fields() {
        let template = EndpointTemplate::resolve("vagalume").unwrap();
        let query = ValidQuery::ArtistSong {
            artist: "AC/DC".to_string(),
            song: "Rock & Roll {Live}".to_string(),
        };
        assert_eq!(
            template.render(&query, "k3y"),
            "https://api.vagalume.com.br/search.php?art=AC%2FDC&mus=Rock%20%26%20Roll%20%7BLive%7D&apikey=k3y"
        );
    }

    #[test]
    fn test_render_free_text() {
        let template = EndpointTemplate::parse("https://example.com/s/{query}").unwrap();
        let query = ValidQuery::FreeText {
            text: "café del mar".to_string(),
        };
        assert_eq!(
            template.render(&query, ""),
            "https://example.com/s/caf%C3%A9%20del%20mar"
        );
    }

    #[test]
    fn test_layers_override_in_order() {
        let file = ConfigLayer {
            endpoint: Some("lyrics-ovh".to_string()),
            api_key: Some("from-file".to_string()),
            supersede: Some(true),
        };
        let env = ConfigLayer::from_vars(|name| match name {
            API_KEY_ENV => Some("from-env".to_string()),
            _ => None,
        });
        let cli = ConfigLayer {
            endpoint: Some("vagalume".to_string()),
            ..Default::default()
        };

        let config = Config::from_layers([file, env, cli]).unwrap();
        assert_eq!(config.endpoint, EndpointTemplate::resolve("vagalume").unwrap());
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.submit_policy, SubmitPolicy::Supersede);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let layer = ConfigLayer::from_vars(|_| Some("   ".to_string()));
        assert!(layer.endpoint.is_none());
        assert!(layer.api_key.is_none());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let vagalume = ConfigLayer {
            endpoint: Some("vagalume".to_string()),
            ..Default::default()
        };
        let result = Config::from_layers([vagalume]);
        assert!(matches!(result, Err(ConfigError::MissingApiKey)));

        let config = Config::from_layers([ConfigLayer::default()]).unwrap();
        assert_eq!(config.submit_policy, SubmitPolicy::IgnoreWhileLoading);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "endpoint": "https://example.com/?q={{query}}", "supersede": true }}"#
        )
        .unwrap();

        let layer = ConfigLayer::from_file(file.path()).unwrap().unwrap();
        assert_eq!(layer.endpoint.as_deref(), Some("https://example.com/?q={query}"));
        assert_eq!(layer.supersede, Some(true));
    }

    #[test]
    fn test_config_file_missing_or_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("config.json");
        assert!(ConfigLayer::from_file(&missing).unwrap().is_none());

        std::fs::write(&missing, r#"{ "endpont": "typo" }"#).unwrap();
        assert!(matches!(
            ConfigLayer::from_file(&missing),
            Err(ConfigError::Json { .. })
        ));
    }
}
