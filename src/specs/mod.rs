// src/specs/mod.rs
//! # Listing page specs
//!
//! Each parser knows how one listing's markup encodes the ground truth: the total
//! page count and the award rows (subject, award time, reason fragment).
//!
//! Specs only extract. Deciding when to fetch, deduplicating, persisting and
//! grouping all live elsewhere (`scrape`, `ledger`, `episodes`).
//!
//! Specs must be testable offline against captured or synthetic markup.

pub mod badges;

pub use badges::BadgePageParser;

use crate::error::Result;
use crate::event::Award;

/// One listing page, parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedPage {
    /// Total pages the listing reported on this response.
    pub page_count: u32,
    /// Award rows in listing order.
    pub awards: Vec<Award>,
}

pub trait PageParser {
    /// Parse page `page` of `category_id`'s listing.
    fn parse(&self, category_id: u64, page: u32, raw: &str) -> Result<ParsedPage>;
}
