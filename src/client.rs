//! HTTP client for the segment endpoints

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::config::ClientConfig;
use crate::segment::{EmbedTemplate, Segment, Variant};

/// Why a segment fetch failed
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Malformed segment list: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Anything that can answer a search term with an ordered list of segments
#[async_trait]
pub trait SegmentSource: Send + Sync {
    async fn fetch(&self, term: &str) -> Result<Vec<Segment>, FetchError>;

    /// Endpoint variant this source speaks
    fn variant(&self) -> Variant;
}

/// Segment source backed by the Clipfinder HTTP API
pub struct HttpSegmentClient {
    base_url: url::Url,
    variant: Variant,
    template: EmbedTemplate,
    client: reqwest::Client,
}

impl HttpSegmentClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            base_url: url::Url::parse(&config.server_url)?,
            variant: config.variant,
            template: config.embed_template(),
            client,
        })
    }

    /// Full request URL for a term, with the term percent-encoded into the path.
    ///
    /// Any path already on the server URL is kept as a prefix, so the API can
    /// be mounted below the site root.
    pub fn endpoint(&self, term: &str) -> url::Url {
        let path = format!(
            "{}{}{}",
            self.base_url.path().trim_end_matches('/'),
            self.variant.path_prefix(),
            urlencoding::encode(term)
        );

        let mut url = self.base_url.clone();
        url.set_path(&path);
        url.set_query(None);
        url
    }
}

#[async_trait]
impl SegmentSource for HttpSegmentClient {
    async fn fetch(&self, term: &str) -> Result<Vec<Segment>, FetchError> {
        let url = self.endpoint(term);
        debug!("Fetching segments from {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        let body = response.bytes().await?;
        let segments = self.variant.decode(&body, &self.template)?;
        debug!("Received {} segments for '{}'", segments.len(), term);
        Ok(segments)
    }

    fn variant(&self) -> Variant {
        self.variant
    }
}
