// tests/runner_e2e.rs
mod common;

use std::fs;

use badge_scrape::episodes::DelimitedId;
use badge_scrape::error::Error;
use badge_scrape::runner;
use badge_scrape::specs::BadgePageParser;

use common::*;

// Election 3: caucus on Apr 1, constituent a week later. Election 4: caucus only.
fn election_listing() -> MockListing {
    let e3 = election_reason(3);
    let e4 = election_reason(4);
    MockListing::new()
        .with_category(SHERIFF, &[&[(99, "2014-01-01 00:00:00Z", "")]])
        .with_category(
            CONSTITUENT,
            &[&[(11, "2015-04-08 03:00:00Z", e3.as_str()), (10, "2015-04-08 01:00:00Z", e3.as_str())]],
        )
        .with_category(
            CAUCUS,
            &[
                &[(22, "2016-01-01 00:00:00Z", e4.as_str()), (21, "2015-04-01 02:30:00Z", e3.as_str())],
                &[(20, "2015-04-01 00:00:00Z", e3.as_str())],
            ],
        )
}

#[test]
fn full_pass_scrapes_persists_and_correlates() {
    let dir = tempfile::tempdir().unwrap();
    let opts = run_options(dir.path());
    let mut listing = election_listing();

    let summary = runner::run(&opts, &mut listing, &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();

    let new: Vec<(u64, usize)> = summary.reports.iter().map(|(c, r)| (*c, r.new)).collect();
    assert_eq!(new, vec![(SHERIFF, 1), (CONSTITUENT, 2), (CAUCUS, 3)]);

    let c = summary.correlation.unwrap();
    assert_eq!(c.episodes.keys().copied().collect::<Vec<_>>(), vec![3]);
    assert_eq!(c.qualifying_only.keys().copied().collect::<Vec<_>>(), vec![4]);
    assert!(c.primary_only.is_empty());

    let e = &c.episodes[&3];
    assert_eq!((e.qualifying_count, e.primary_count), (2, 2));
    assert_eq!(e.series.qualifying_per_hour.len(), 172);
    assert_eq!(e.series.first_primary_hour, Some(169));
    assert_eq!(e.series.qualifying_cumulative[2], 2);
    assert_eq!(e.series.primary_cumulative.last(), Some(&2));

    for name in ["sheriff", "constituent", "caucus"] {
        assert!(dir.path().join(format!("example.test-{name}.csv")).exists());
        assert!(dir.path().join(format!("example.test-{name}.json")).exists());
    }
    let report_path = dir.path().join("example.test-episodes.json");
    assert!(summary.files_written.contains(&report_path));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["host"], "example.test");
    assert_eq!(report["episodes"][0]["episode_id"], 3);
    assert_eq!(report["episodes"][0]["title"], "for Moderator Election 3");
    assert_eq!(report["episodes"][0]["start_utc"], "2015-04-01 00:00:00Z");
    assert_eq!(report["episodes"][0]["series"]["first_primary_hour"], 169);
    assert_eq!(report["pending"], serde_json::json!([4]));
}

#[test]
fn no_update_works_from_snapshots_alone() {
    let dir = tempfile::tempdir().unwrap();
    let opts = run_options(dir.path());
    runner::run(&opts, &mut election_listing(), &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();

    let mut offline = opts.clone();
    offline.update = false;
    offline.write = false;
    let mut untouched = MockListing::new();
    let summary = runner::run(&offline, &mut untouched, &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();

    assert!(untouched.requests.is_empty());
    assert!(summary.reports.is_empty());
    assert!(summary.files_written.is_empty());
    assert_eq!(summary.correlation.unwrap().episodes.len(), 1);
}

#[test]
fn no_write_leaves_only_ledgers() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = run_options(dir.path());
    opts.write = false;

    runner::run(&opts, &mut election_listing(), &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "example.test-caucus.csv",
            "example.test-caucus.reasons.csv",
            "example.test-constituent.csv",
            "example.test-constituent.reasons.csv",
            "example.test-sheriff.csv",
            "example.test-sheriff.reasons.csv",
        ]
    );
}

// A run without snapshots leaves the reason logs as the only record of reasons.
fn first_run_without_snapshots(dir: &std::path::Path) -> badge_scrape::config::options::RunOptions {
    let mut opts = run_options(dir);
    opts.write = false;
    runner::run(&opts, &mut election_listing(), &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();
    assert!(!dir.join("example.test-caucus.json").exists());
    opts
}

#[test]
fn early_stop_rerun_after_no_write_still_correlates() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = first_run_without_snapshots(dir.path());
    opts.scrape.stop_on_existing = true;

    // Every page now yields nothing new, so every existing award's reason
    // has to come from disk.
    let mut listing = election_listing();
    let summary = runner::run(&opts, &mut listing, &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();

    assert!(summary.reports.iter().all(|(_, r)| r.new == 0 && r.stopped_early));
    assert_eq!(listing.requests, vec![(SHERIFF, 1), (CONSTITUENT, 1), (CAUCUS, 1)]);
    let c = summary.correlation.unwrap();
    assert_eq!(c.episodes.keys().copied().collect::<Vec<_>>(), vec![3]);
    assert_eq!(c.qualifying_only.keys().copied().collect::<Vec<_>>(), vec![4]);
}

#[test]
fn offline_rerun_after_no_write_still_correlates() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = first_run_without_snapshots(dir.path());
    opts.update = false;

    let mut untouched = MockListing::new();
    let summary = runner::run(&opts, &mut untouched, &BadgePageParser::default(), &DelimitedId::default(), None).unwrap();

    assert!(untouched.requests.is_empty());
    let c = summary.correlation.unwrap();
    assert_eq!(c.episodes[&3].reason, election_reason(3));
    assert_eq!((c.episodes[&3].qualifying_count, c.episodes[&3].primary_count), (2, 2));
}

#[test]
fn lost_reason_log_is_reported_as_missing_reason() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = first_run_without_snapshots(dir.path());
    opts.update = false;
    fs::remove_file(dir.path().join("example.test-caucus.reasons.csv")).unwrap();

    let err = runner::run(&opts, &mut MockListing::new(), &BadgePageParser::default(), &DelimitedId::default(), None)
        .unwrap_err();
    assert!(matches!(err, Error::MissingReason { category_id: CAUCUS, .. }), "{err}");
}

#[test]
fn forever_mode_still_aborts_on_integrity_errors() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = run_options(dir.path());
    opts.forever = true;

    // Same election id on two caucus episodes a year apart.
    let e3 = election_reason(3);
    let mut listing = MockListing::new()
        .with_category(CONSTITUENT, &[&[]])
        .with_category(CAUCUS, &[&[(2, "2016-04-01 00:00:00Z", e3.as_str()), (1, "2015-04-01 00:00:00Z", e3.as_str())]]);

    let err = runner::run(&opts, &mut listing, &BadgePageParser::default(), &DelimitedId::default(), None).unwrap_err();
    assert!(matches!(err, Error::DuplicateEpisodeId { category_id: CAUCUS, episode_id: 3 }));
}
