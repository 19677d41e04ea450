// src/scrape.rs
//
// Incremental scrape of one badge listing into its ledger.
//
// Strictly sequential: wait, fetch page N, parse, merge, then decide whether
// page N+1 exists. The page count is re-read from every response because the
// listing grows while we walk it.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use serde::Serialize;

use crate::config::options::ScrapeOptions;
use crate::core::net::PageFetcher;
use crate::error::Result;
use crate::event::{Award, Event};
use crate::ledger::Ledger;
use crate::progress::{NullProgress, Progress};
use crate::specs::PageParser;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeReport {
    /// Events written to the ledger by this run.
    pub new: usize,
    /// Events that were already in the ledger before this run (and did not
    /// end it early).
    pub known: usize,
    /// Events seen twice within this run (listing shifted between requests).
    pub overlap: usize,
    /// Pages whose rows were merged.
    pub pages_visited: u32,
    /// Stopped at a known event rather than at the end of the list.
    pub stopped_early: bool,
}

/* ---------------- Page stream ---------------- */

/// One merged-ready listing page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub page_count: u32,
    pub awards: Vec<Award>,
}

/// Pull-based page producer: each `next()` sleeps the request interval,
/// fetches and parses exactly one page. Ends when a response reports fewer
/// pages than the one asked for; stops for good after the first error.
pub struct Pages<'a> {
    fetcher: &'a mut dyn PageFetcher,
    parser: &'a dyn PageParser,
    category_id: u64,
    interval: Duration,
    next_page: u32,
    finished: bool,
    end_of_list: Option<u32>,
}

impl<'a> Pages<'a> {
    pub fn new(
        fetcher: &'a mut dyn PageFetcher,
        parser: &'a dyn PageParser,
        category_id: u64,
        interval: Duration,
    ) -> Self {
        Self { fetcher, parser, category_id, interval, next_page: 1, finished: false, end_of_list: None }
    }

    /// The page number found missing, once the list has been walked to its end.
    pub fn end_of_list(&self) -> Option<u32> {
        self.end_of_list
    }

    fn pull(&mut self) -> Result<Option<Page>> {
        let number = self.next_page;

        // Unconditional; bounds request rate regardless of response time.
        thread::sleep(self.interval);

        let raw = self.fetcher.fetch(self.category_id, number)?;
        let parsed = self.parser.parse(self.category_id, number, &raw)?;

        if number > parsed.page_count {
            self.end_of_list = Some(number);
            return Ok(None);
        }

        self.next_page += 1;
        Ok(Some(Page { number, page_count: parsed.page_count, awards: parsed.awards }))
    }
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let out = self.pull();
        if !matches!(out, Ok(Some(_))) {
            self.finished = true;
        }
        out.transpose()
    }
}

/* ---------------- Merge ---------------- */

/// Walk the listing from page 1, recording every award not yet in `ledger`.
///
/// With `stop_on_existing`, the run ends at the first award that was in the
/// ledger before the run began. That is only correct if the ledger already
/// holds *every* award up to that point; after an interrupted run it may not,
/// and older awards past the gap would be silently skipped. Nothing here can
/// detect that; it is the caller's call.
pub fn run(
    ledger: &mut Ledger,
    fetcher: &mut dyn PageFetcher,
    parser: &dyn PageParser,
    options: &ScrapeOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<ScrapeReport> {
    let mut null = NullProgress;
    let progress: &mut dyn Progress = match progress {
        Some(p) => p,
        None => &mut null,
    };

    let category_id = ledger.category_id();
    progress.begin(category_id);

    let mut report = ScrapeReport::default();
    let mut recorded: HashSet<Event> = HashSet::new();
    let mut pages = Pages::new(fetcher, parser, category_id, options.request_interval);

    for page in pages.by_ref() {
        let page = page?;
        report.pages_visited += 1;
        progress.page_fetched(page.number, page.page_count);

        for award in page.awards {
            let event = award.event;
            if ledger.record(award)? {
                report.new += 1;
                recorded.insert(event);
                progress.event_recorded(&event);
            } else if recorded.contains(&event) {
                report.overlap += 1;
                progress.event_overlap(&event);
            } else if options.stop_on_existing {
                // The stopping event is not counted as known.
                report.stopped_early = true;
                progress.finish(&report);
                return Ok(report);
            } else {
                report.known += 1;
                progress.event_known(&event);
            }
        }
    }

    if let Some(page) = pages.end_of_list() {
        progress.end_of_list(page);
    }
    progress.finish(&report);
    Ok(report)
}

/// A fetcher/parser pair bound to scrape options, reusable across ledgers.
pub struct IncrementalScraper<F, P> {
    fetcher: F,
    parser: P,
    options: ScrapeOptions,
}

impl<F: PageFetcher, P: PageParser> IncrementalScraper<F, P> {
    pub fn new(fetcher: F, parser: P, options: ScrapeOptions) -> Self {
        Self { fetcher, parser, options }
    }

    pub fn run(&mut self, ledger: &mut Ledger, progress: Option<&mut dyn Progress>) -> Result<ScrapeReport> {
        run(ledger, &mut self.fetcher, &self.parser, &self.options, progress)
    }
}
