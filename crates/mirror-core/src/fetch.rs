//! Remote access
//!
//! [`Fetcher`] is the seam between the sync engine and the network. The
//! production implementation is a blocking `reqwest` client; tests supply
//! an in-memory one.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use crate::{Error, Result};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("listing-mirror/", env!("CARGO_PKG_VERSION"));

/// Blocking access to listing pages and file content.
pub trait Fetcher {
    /// Fetch a listing page as text.
    fn get_text(&self, url: &str) -> Result<String>;

    /// Stream the body at `url` into `sink`, returning the byte count.
    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// [`Fetcher`] backed by `reqwest::blocking`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a client with the given request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: Option<&str>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent.unwrap_or(DEFAULT_USER_AGENT))
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }

    fn send(&self, url: &str) -> Result<reqwest::blocking::Response> {
        let response = self.client.get(url).send().map_err(|e| Error::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Fetcher for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "GET listing");
        self.send(url)?.text().map_err(|e| Error::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    fn download(&self, url: &str, sink: &mut dyn Write) -> Result<u64> {
        tracing::debug!(url, "GET file");
        let mut response = self.send(url)?;
        response.copy_to(sink).map_err(|e| Error::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

/// Listing pages already fetched during one sync.
///
/// Owned by a single `sync` call, so a page visited twice in one run is
/// fetched once and nothing leaks between runs.
#[derive(Debug, Default)]
pub struct PageCache {
    pages: HashMap<String, String>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The page at `url`, fetching it on first use.
    pub fn page(&mut self, fetcher: &dyn Fetcher, url: &str) -> Result<String> {
        if let Some(page) = self.pages.get(url) {
            tracing::trace!(url, "listing cache hit");
            return Ok(page.clone());
        }
        let page = fetcher.get_text(url)?;
        self.pages.insert(url.to_string(), page.clone());
        Ok(page)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
