pub mod types;

use crate::config::Config;
use crate::error::TransportError;
use crate::query::ValidQuery;
use async_trait::async_trait;
use std::fmt;

/// A fully built GET request
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub url: String,
    redacted_url: String,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            redacted_url: url.clone(),
            url,
        }
    }
}

// Debug and Display both hide the API key so descriptors are safe to log
impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("url", &self.redacted_url)
            .finish()
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted_url)
    }
}

/// Interpolate the query into the configured endpoint template
pub fn build_request(config: &Config, query: &ValidQuery) -> RequestDescriptor {
    let api_key = config.api_key.as_deref().unwrap_or_default();
    let url = config.endpoint.render(query, api_key);
    let redacted_url = if config.endpoint.uses_api_key() {
        config.endpoint.render(query, "***")
    } else {
        url.clone()
    };
    RequestDescriptor { url, redacted_url }
}

/// Body of a 2xx response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// The single network call of a lookup
#[async_trait]
pub trait LyricsTransport: Send + Sync {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError>;
}

/// reqwest-backed transport with the platform default timeouts
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LyricsTransport for HttpTransport {
    async fn execute(&self, request: &RequestDescriptor) -> Result<RawResponse, TransportError> {
        tracing::debug!("Fetching lyrics: {}", request);

        let response = self
            .client
            .get(&request.url)
            .send()
            .await
            .map_err(|e| TransportError::NetworkFailure(e.without_url().to_string()))?;

        // The body of an error response is never used, so don't wait for it
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Lyrics service returned {} for {}", status, request);
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::NetworkFailure(e.without_url().to_string()))?;

        Ok(RawResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigLayer, EndpointTemplate};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[test]
    fn test_build_request_is_deterministic() {
        let config = Config::default();
        let query = ValidQuery::ArtistSong {
            artist: "Guns N' Roses".to_string(),
            song: "Sweet Child O' Mine".to_string(),
        };

        let first = build_request(&config, &query);
        let second = build_request(&config, &query);
        assert_eq!(first, second);
        assert_eq!(
            first.url,
            "https://api.lyrics.ovh/v1/Guns%20N%27%20Roses/Sweet%20Child%20O%27%20Mine"
        );
        assert_eq!(first.to_string(), first.url);
    }

    #[test]
    fn test_build_request_redacts_api_key() {
        let config = Config::from_layers([ConfigLayer {
            endpoint: Some("vagalume".to_string()),
            api_key: Some("secret".to_string()),
            supersede: None,
        }])
        .unwrap();
        let query = ValidQuery::ArtistSong {
            artist: "Queen".to_string(),
            song: "Bohemian Rhapsody".to_string(),
        };

        let request = build_request(&config, &query);
        assert!(request.url.ends_with("&apikey=secret"));
        assert!(!request.to_string().contains("secret"));
        assert!(!format!("{:?}", request).contains("secret"));
        assert!(request.to_string().ends_with("&apikey=%2A%2A%2A"));
    }

    #[test]
    fn test_build_request_free_text() {
        let config = Config {
            endpoint: EndpointTemplate::parse("https://example.com/search?q={query}").unwrap(),
            ..Default::default()
        };
        let query = ValidQuery::FreeText {
            text: "hey jude".to_string(),
        };
        assert_eq!(
            build_request(&config, &query),
            RequestDescriptor::new("https://example.com/search?q=hey%20jude")
        );
    }

    /// Serve one canned HTTP response on a local port, then close the socket
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    return;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        format!("http://{}/v1/Queen/Bohemian%20Rhapsody", addr)
    }

    fn local_transport() -> HttpTransport {
        HttpTransport::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
    }

    fn http_response(status_line: &str, content_length: usize, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line, content_length, body
        )
    }

    #[tokio::test]
    async fn test_http_transport_returns_body_on_success() {
        let body = r#"{ "lyrics": "Is this the real life..." }"#;
        let url = serve_once(http_response("200 OK", body.len(), body)).await;

        let raw = local_transport()
            .execute(&RequestDescriptor::new(url))
            .await
            .unwrap();
        assert_eq!(
            raw,
            RawResponse {
                status: 200,
                body: body.to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_http_transport_maps_error_status() {
        let url = serve_once(http_response("500 Internal Server Error", 0, "")).await;

        let result = local_transport()
            .execute(&RequestDescriptor::new(url))
            .await;
        assert_eq!(result, Err(TransportError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_http_transport_keeps_status_when_error_body_is_truncated() {
        // Announces 100 bytes but sends 5 before closing
        let url = serve_once(http_response("500 Internal Server Error", 100, "oops!")).await;

        let result = local_transport()
            .execute(&RequestDescriptor::new(url))
            .await;
        assert_eq!(result, Err(TransportError::HttpStatus(500)));
    }

    #[tokio::test]
    async fn test_http_transport_not_found_status() {
        let body = r#"{ "error": "No lyrics found" }"#;
        let url = serve_once(http_response("404 Not Found", body.len(), body)).await;

        let result = local_transport()
            .execute(&RequestDescriptor::new(url))
            .await;
        assert_eq!(result, Err(TransportError::HttpStatus(404)));
    }

    #[tokio::test]
    async fn test_http_transport_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = local_transport()
            .execute(&RequestDescriptor::new(format!("http://{}/", addr)))
            .await;
        assert!(
            matches!(result, Err(TransportError::NetworkFailure(_))),
            "got {:?}",
            result
        );
    }
}
