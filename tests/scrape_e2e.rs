// tests/scrape_e2e.rs
mod common;

use std::time::{Duration, Instant};

use badge_scrape::config::options::ScrapeOptions;
use badge_scrape::error::Error;
use badge_scrape::scrape::{self, IncrementalScraper, ScrapeReport};
use badge_scrape::specs::BadgePageParser;
use badge_scrape::{Event, Ledger};

use common::*;

const T1: &str = "2015-04-20 01:00:15Z";
const T2: &str = "2015-04-20 01:00:10Z";
const T3: &str = "2015-04-19 23:59:59Z";

fn two_page_listing() -> MockListing {
    MockListing::new().with_category(CAUCUS, &[&[(1, T1, ""), (2, T2, "")], &[(3, T3, "")]])
}

#[test]
fn fresh_run_then_rerun_with_and_without_early_stop() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caucus.csv");
    let parser = BadgePageParser::default();
    let mut listing = two_page_listing();

    let mut ledger = Ledger::open(CAUCUS, &path).unwrap();
    let first = scrape::run(&mut ledger, &mut listing, &parser, &fast_scrape(false), None).unwrap();
    assert_eq!(first, ScrapeReport { new: 3, known: 0, overlap: 0, pages_visited: 2, stopped_early: false });
    assert_eq!(ledger.len(), 3);
    // Page 3 was asked for and found past the end.
    assert_eq!(listing.requests, vec![(CAUCUS, 1), (CAUCUS, 2), (CAUCUS, 3)]);

    let second = scrape::run(&mut ledger, &mut listing, &parser, &fast_scrape(false), None).unwrap();
    assert_eq!((second.new, second.known, second.pages_visited), (0, 3, 2));

    listing.requests.clear();
    let third = scrape::run(&mut ledger, &mut listing, &parser, &fast_scrape(true), None).unwrap();
    assert_eq!(third, ScrapeReport { new: 0, known: 0, overlap: 0, pages_visited: 1, stopped_early: true });
    assert_eq!(listing.requests, vec![(CAUCUS, 1)]);
    assert_eq!(ledger.len(), 3);
}

#[test]
fn rows_repeated_across_pages_count_as_overlap() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::open(CAUCUS, dir.path().join("c.csv")).unwrap();
    // The listing shifted by one row between requests: row 2 shows up again on page 2.
    let mut listing = MockListing::new().with_category(CAUCUS, &[&[(1, T1, ""), (2, T2, "")], &[(2, T2, ""), (3, T3, "")]]);

    let report = scrape::run(&mut ledger, &mut listing, &BadgePageParser::default(), &fast_scrape(true), None).unwrap();
    assert_eq!(report.new, 3);
    assert_eq!(report.overlap, 1);
    assert!(!report.stopped_early);
}

#[test]
fn transport_failure_keeps_what_was_already_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.csv");
    let mut listing = two_page_listing();
    listing.fail_on = Some((CAUCUS, 2));

    {
        let mut ledger = Ledger::open(CAUCUS, &path).unwrap();
        let err = scrape::run(&mut ledger, &mut listing, &BadgePageParser::default(), &fast_scrape(false), None).unwrap_err();
        assert!(matches!(err, Error::Transport { .. }));
        assert!(err.is_transient());
    }

    listing.fail_on = None;
    let mut ledger = Ledger::open(CAUCUS, &path).unwrap();
    assert_eq!(ledger.len(), 2);
    let report = scrape::run(&mut ledger, &mut listing, &BadgePageParser::default(), &fast_scrape(false), None).unwrap();
    assert_eq!((report.new, report.known), (1, 2));
    assert!(ledger.contains(&Event::new(CAUCUS, 3, 1429487999)));
}

#[test]
fn unparsable_page_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::open(CAUCUS, dir.path().join("c.csv")).unwrap();
    let mut bad = |_: u64, _: u32| -> badge_scrape::Result<String> { Ok(listing_page(&[(1, "yesterday", "")], 1)) };

    let err = scrape::run(&mut ledger, &mut bad, &BadgePageParser::default(), &fast_scrape(false), None).unwrap_err();
    assert!(matches!(err, Error::Parse { page: 1, .. }));
    assert!(ledger.is_empty());
}

#[test]
fn every_request_waits_the_interval_first() {
    let dir = tempfile::tempdir().unwrap();
    let mut ledger = Ledger::open(CAUCUS, dir.path().join("c.csv")).unwrap();
    let interval = Duration::from_millis(40);
    let options = ScrapeOptions { stop_on_existing: false, request_interval: interval };

    let mut sent = Vec::new();
    let mut paced = |_: u64, page: u32| -> badge_scrape::Result<String> {
        sent.push(Instant::now());
        Ok(listing_page(&[(u64::from(page), T1, "")], 2))
    };

    let started = Instant::now();
    let report = scrape::run(&mut ledger, &mut paced, &BadgePageParser::default(), &options, None).unwrap();
    assert_eq!(report.pages_visited, 2);

    // Pages 1 and 2, then page 3 found past the end.
    assert_eq!(sent.len(), 3);
    assert!(sent[0] - started >= interval, "first request went out after {:?}", sent[0] - started);
    for pair in sent.windows(2) {
        assert!(pair[1] - pair[0] >= interval, "requests {:?} apart", pair[1] - pair[0]);
    }
}

#[test]
fn scraper_records_reasons_durably() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("c.csv");
    let reason = election_reason(5);
    let listing = MockListing::new().with_category(CAUCUS, &[&[(1, T1, reason.as_str())]]);
    let event = Event::new(CAUCUS, 1, 1429491615);

    {
        let mut ledger = Ledger::open(CAUCUS, &path).unwrap();
        let mut scraper = IncrementalScraper::new(listing, BadgePageParser::default(), fast_scrape(false));
        scraper.run(&mut ledger, None).unwrap();
        assert_eq!(ledger.reason(&event), Some(reason.as_str()));
    }

    let reopened = Ledger::open(CAUCUS, &path).unwrap();
    assert_eq!(reopened.reason(&event), Some(reason.as_str()));
}
