// HTTP post feed source

use crate::config::SourceConfig;
use crate::errors::FetchError;
use crate::models::Post;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Capability to fetch the post feed.
///
/// The pipeline only depends on this trait so fetching is testable with
/// fake implementations.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch the full post feed from the upstream source.
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError>;
}

/// PostSource backed by an HTTP GET against a fixed feed URL
pub struct HttpPostSource {
    client: Client,
    url: String,
}

impl HttpPostSource {
    /// Create a new source with the configured URL and request timeout
    pub fn new(config: &SourceConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FetchError::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl PostSource for HttpPostSource {
    #[instrument(skip(self), fields(url = %self.url))]
    async fn fetch_posts(&self) -> Result<Vec<Post>, FetchError> {
        debug!("Fetching posts from feed");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus(status.as_u16()));
        }

        let posts = response
            .json::<Vec<Post>>()
            .await
            .map_err(|e| FetchError::InvalidBody(e.to_string()))?;

        info!(count = posts.len(), "Fetched posts from feed");
        Ok(posts)
    }
}
