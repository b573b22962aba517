use crate::config::CrawlConfig;
use crate::error::{ConfigError, FetchError};
use reqwest::blocking::Client;
use scraper::Html;
use std::collections::HashMap;

/// Source of listing pages.
///
/// Stages only care whether a usable document came back; the cause of a
/// failure is logged here and then dropped.
pub trait Fetch {
    /// Fetch the raw body of a page
    fn fetch_html(&self, url: &str) -> Result<String, FetchError>;

    /// Fetch and parse a page, or `None` if it could not be fetched
    fn fetch_document(&self, url: &str) -> Option<Html> {
        match self.fetch_html(url) {
            Ok(body) => {
                ::log::debug!("Fetched {} ({} bytes)", url, body.len());
                Some(Html::parse_document(&body))
            }
            Err(e) => {
                ::log::warn!("Skipping page: {}", e);
                None
            }
        }
    }
}

/// Fetches pages over HTTP with a blocking client
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let request_error = |source| FetchError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().map_err(request_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(request_error)
    }
}

/// Serves pages from memory; URLs without a page fail to fetch
#[derive(Debug, Default, Clone)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }
}

impl Fetch for StaticFetcher {
    fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Missing(url.to_string()))
    }
}
