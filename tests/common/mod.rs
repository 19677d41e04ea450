// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use badge_scrape::config::options::{CategorySpec, Role, RunOptions, ScrapeOptions};
use badge_scrape::error::{Error, Result};

pub const CONSTITUENT: u64 = 1974;
pub const CAUCUS: u64 = 1973;
pub const SHERIFF: u64 = 3109;

pub fn election_reason(id: u64) -> String {
    format!(r#"for <a href="/election/{id}">Moderator Election {id}</a>"#)
}

/// A badge listing page in the site's markup.
/// `rows`: (user id, award time text, reason html).
pub fn listing_page(rows: &[(u64, &str, &str)], page_count: u32) -> String {
    let mut html = String::from("<html><body><div class=\"single-badge-table\">");
    for (user, when, reason) in rows {
        html.push_str(&format!(
            "<div class=\"single-badge-row-user\"><a href=\"/users/{user}/u\">u</a>\
             <div class=\"single-badge-reason\">{reason}</div>\
             Awarded <span title=\"{when}\">x</span></div>"
        ));
    }
    html.push_str("</div><div class=\"pager\">");
    for p in 1..=page_count {
        html.push_str(&format!("<span class=\"page-numbers\">{p}</span>"));
    }
    html.push_str("</div></body></html>");
    html
}

/// Canned listings keyed by (category, page). Pages past the end come back
/// empty with the category's page count, like the live site.
#[derive(Default)]
pub struct MockListing {
    pages: HashMap<(u64, u32), String>,
    counts: HashMap<u64, u32>,
    pub requests: Vec<(u64, u32)>,
    /// Fail with a transport error on this request.
    pub fail_on: Option<(u64, u32)>,
}

impl MockListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `category`'s pages; each entry is one page's rows.
    pub fn with_category(mut self, category: u64, pages: &[&[(u64, &str, &str)]]) -> Self {
        let count = pages.len() as u32;
        self.counts.insert(category, count);
        for (i, rows) in pages.iter().enumerate() {
            self.pages.insert((category, i as u32 + 1), listing_page(rows, count));
        }
        self
    }

    pub fn serve(&mut self, category: u64, page: u32) -> Result<String> {
        self.requests.push((category, page));
        if self.fail_on == Some((category, page)) {
            return Err(Error::Transport { url: format!("mock://{category}/{page}"), message: "connection reset".into() });
        }
        Ok(match self.pages.get(&(category, page)) {
            Some(html) => html.clone(),
            None => listing_page(&[], self.counts.get(&category).copied().unwrap_or(1)),
        })
    }
}

impl badge_scrape::core::PageFetcher for MockListing {
    fn fetch(&mut self, category_id: u64, page: u32) -> Result<String> {
        self.serve(category_id, page)
    }
}

pub fn fast_scrape(stop_on_existing: bool) -> ScrapeOptions {
    ScrapeOptions { stop_on_existing, request_interval: Duration::ZERO }
}

pub fn run_options(data_dir: &std::path::Path) -> RunOptions {
    RunOptions {
        data_dir: data_dir.to_path_buf(),
        host: "example.test".into(),
        categories: vec![
            CategorySpec::new(SHERIFF, "sheriff", Role::Tracked),
            CategorySpec::new(CONSTITUENT, "constituent", Role::Primary),
            CategorySpec::new(CAUCUS, "caucus", Role::Qualifying),
        ],
        scrape: fast_scrape(false),
        forever_sleep: Duration::ZERO,
        ..RunOptions::default()
    }
}
