//! # HTTP Stream Source
//!
//! `reqwest`-based [`StreamSource`] for media servers exposing the
//! `Audio/{id}/stream` endpoint. Enabled with the `http-streaming` feature.

use crate::error::{PlaybackError, Result};
use crate::traits::{ByteStream, StreamSource};
use async_trait::async_trait;
use cadence_library::models::TrackId;
use futures_util::StreamExt;
use tracing::debug;

/// Streams track audio over HTTP(S).
///
/// Session negotiation and authentication belong to the host; this source
/// only needs the base URL and, optionally, a bearer token to attach to each
/// request.
pub struct HttpStreamSource {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpStreamSource {
    /// Create a source for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a source reusing an existing HTTP client (connection pooling).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            bearer_token: None,
        }
    }

    /// Attach a bearer token to every stream request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn stream_url(&self, track_id: &TrackId) -> String {
        format!("{}/Audio/{}/stream", self.base_url, track_id)
    }
}

#[async_trait]
impl StreamSource for HttpStreamSource {
    async fn fetch_stream(&self, track_id: &TrackId) -> Result<ByteStream> {
        let url = self.stream_url(track_id);
        debug!(%url, "opening audio stream");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Transport(format!(
                "unexpected status {} streaming track {}",
                status, track_id
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(PlaybackError::from));
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_url_joins_without_double_slash() {
        let source = HttpStreamSource::new("https://music.example.org/");
        assert_eq!(
            source.stream_url(&TrackId::new("abc123")),
            "https://music.example.org/Audio/abc123/stream"
        );
    }

    #[test]
    fn bearer_token_is_stored() {
        let source = HttpStreamSource::new("http://host").with_bearer_token("tok");
        assert_eq!(source.bearer_token.as_deref(), Some("tok"));
    }
}
