// src/core/net.rs
//
// Listing transport. The scraper only sees `PageFetcher`; retry/backoff policy,
// if any, belongs to the implementation, not the caller.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::consts::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::error::{Error, Result};

/// Raw page content for one listing page.
pub trait PageFetcher {
    fn fetch(&mut self, category_id: u64, page: u32) -> Result<String>;
}

/// Any `FnMut(category, page)` is a fetcher; handy for fixtures.
impl<F> PageFetcher for F
where
    F: FnMut(u64, u32) -> Result<String>,
{
    fn fetch(&mut self, category_id: u64, page: u32) -> Result<String> {
        self(category_id, page)
    }
}

/// GET `<base>/help/badges/<category>?page=<n>`.
pub struct HttpFetcher {
    client: Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(host: &str) -> Result<Self> {
        Self::with_base_url(format!("https://{host}"))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn listing_url(&self, category_id: u64, page: u32) -> String {
        format!("{}/help/badges/{}?page={}", self.base_url, category_id, page)
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&mut self, category_id: u64, page: u32) -> Result<String> {
        let url = self.listing_url(category_id, page);
        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Transport { url, message: format!("HTTP error: {status}") });
        }
        Ok(resp.text()?)
    }
}
