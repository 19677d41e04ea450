// src/progress.rs
use tracing::{debug, info, warn};

use crate::event::Event;
use crate::scrape::ScrapeReport;

/// Progress reporting for a scrape run. The scraper calls these at fixed
/// points and never formats output itself; frontends decide what to show.
pub trait Progress {
    /// A run over `category_id` is starting.
    fn begin(&mut self, _category_id: u64) {}

    /// Page `page` came back reporting `page_count` pages in total.
    fn page_fetched(&mut self, _page: u32, _page_count: u32) {}

    /// The listing has no page `page`; normal end of list.
    fn end_of_list(&mut self, _page: u32) {}

    /// A new event was written to the ledger.
    fn event_recorded(&mut self, _event: &Event) {}

    /// An event already in the ledger before this run was scraped again.
    fn event_known(&mut self, _event: &Event) {}

    /// An event recorded earlier in this same run showed up again
    /// (the listing shifted between page requests).
    fn event_overlap(&mut self, _event: &Event) {}

    /// Called at the end of a successful run.
    fn finish(&mut self, _report: &ScrapeReport) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Forwards progress to `tracing`.
#[derive(Default)]
pub struct LogProgress {
    category_id: u64,
}

impl Progress for LogProgress {
    fn begin(&mut self, category_id: u64) {
        self.category_id = category_id;
        info!(category_id, "Scraping badge listing");
    }

    fn page_fetched(&mut self, page: u32, page_count: u32) {
        debug!(category_id = self.category_id, "Scraped page {page}/{page_count}");
    }

    fn end_of_list(&mut self, page: u32) {
        info!(category_id = self.category_id, page, "Reached end of list; page does not exist");
    }

    fn event_recorded(&mut self, event: &Event) {
        info!(category_id = self.category_id, subject_id = event.subject_id, utc_time = %event.utc_time(), "Scraped badge");
    }

    fn event_known(&mut self, event: &Event) {
        warn!(category_id = self.category_id, subject_id = event.subject_id, utc_time = %event.utc_time(), "Scraped already-known badge");
    }

    fn event_overlap(&mut self, event: &Event) {
        debug!(category_id = self.category_id, subject_id = event.subject_id, "Badge repeated across pages");
    }

    fn finish(&mut self, r: &ScrapeReport) {
        info!(
            category_id = self.category_id,
            new = r.new,
            known = r.known,
            overlap = r.overlap,
            pages = r.pages_visited,
            stopped_early = r.stopped_early,
            "Update complete"
        );
    }
}
