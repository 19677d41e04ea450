// src/runner.rs
//
// One pass = load/catch up every ledger, scrape each listing, persist
// snapshots, then pair primary and qualifying episodes. `run` repeats passes
// when asked to run forever.

use std::path::PathBuf;
use std::thread;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::options::{CategorySpec, Role, RunOptions};
use crate::core::html::strip_tags;
use crate::core::net::PageFetcher;
use crate::episodes::{correlate, CorrelatedEpisode, Correlation, EpisodeIdExtractor};
use crate::error::Result;
use crate::event::format_utc_time;
use crate::file::write_json_replace;
use crate::ledger::Ledger;
use crate::progress::{NullProgress, Progress};
use crate::scrape::{self, ScrapeReport};
use crate::snapshot::Snapshot;
use crate::specs::PageParser;

/// A category and its open ledger.
pub struct Tracked {
    pub spec: CategorySpec,
    pub ledger: Ledger,
}

/// What one pass did.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Per scraped category, in configuration order. Empty with `--no-update`.
    pub reports: Vec<(u64, ScrapeReport)>,
    /// `None` unless both a primary and a qualifying category are configured.
    pub correlation: Option<Correlation>,
    pub files_written: Vec<PathBuf>,
}

/* ---------------- Setup ---------------- */

/// Open every configured ledger, merging in its snapshot when one exists.
pub fn open_ledgers(opts: &RunOptions) -> Result<Vec<Tracked>> {
    let mut out = Vec::with_capacity(opts.categories.len());
    for spec in &opts.categories {
        let mut ledger = Ledger::open(spec.category_id, opts.ledger_path(spec))?;
        let snap_path = opts.snapshot_path(spec);
        if snap_path.exists() {
            ledger.absorb(&Snapshot::read(&snap_path)?)?;
        }
        info!(name = %spec.name, category_id = spec.category_id, events = ledger.len(), "Ledger ready");
        out.push(Tracked { spec: spec.clone(), ledger });
    }
    Ok(out)
}

/* ---------------- Pass ---------------- */

pub fn run_pass(
    opts: &RunOptions,
    tracked: &mut [Tracked],
    fetcher: &mut dyn PageFetcher,
    parser: &dyn PageParser,
    extractor: &dyn EpisodeIdExtractor,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary> {
    let mut null = NullProgress;
    let progress: &mut dyn Progress = match progress {
        Some(p) => p,
        None => &mut null,
    };

    let mut summary = RunSummary::default();

    if opts.update {
        for t in tracked.iter_mut() {
            let report = scrape::run(&mut t.ledger, fetcher, parser, &opts.scrape, Some(&mut *progress))?;
            summary.reports.push((t.spec.category_id, report));
        }
        if opts.write {
            for t in tracked.iter() {
                let path = opts.snapshot_path(&t.spec);
                t.ledger.snapshot_save(&path)?;
                info!(name = %t.spec.name, path = %path.display(), "Snapshot written");
                summary.files_written.push(path);
            }
        }
    }

    let primary = tracked.iter().find(|t| t.spec.role == Role::Primary);
    let qualifying = tracked.iter().find(|t| t.spec.role == Role::Qualifying);
    if let (Some(p), Some(q)) = (primary, qualifying) {
        let correlation = correlate(&p.ledger, &q.ledger, opts.gap_threshold_secs, extractor)?;
        log_correlation(&correlation);

        if opts.write {
            let path = opts.episode_report_path();
            let report = EpisodeReport::new(opts, p.spec.category_id, q.spec.category_id, &correlation);
            write_json_replace(&path, &report, true)?;
            info!(path = %path.display(), episodes = report.episodes.len(), "Episode report written");
            summary.files_written.push(path);
        }
        summary.correlation = Some(correlation);
    }

    Ok(summary)
}

fn log_correlation(c: &Correlation) {
    for e in c.episodes.values() {
        info!(
            episode_id = e.episode_id,
            start = %format_utc_time(e.start_timestamp),
            qualifying = e.qualifying_count,
            primary = e.primary_count,
            "Episode"
        );
    }
    for id in c.qualifying_only.keys() {
        info!(episode_id = id, "Qualifying phase without primary awards yet");
    }
    for id in c.primary_only.keys() {
        warn!(episode_id = id, "Primary awards without a qualifying phase");
    }
    if let Some(latest) = c.latest() {
        info!(episode_id = latest.episode_id, "There have been {} primary awards in the latest episode", latest.primary_count);
    }
}

/* ---------------- Loop ---------------- */

/// Open the ledgers once, then run one pass (or, with `forever`, pass after
/// pass with `forever_sleep` in between). Transport failures inside a forever
/// loop are logged and retried next pass; anything else ends the run.
pub fn run(
    opts: &RunOptions,
    fetcher: &mut dyn PageFetcher,
    parser: &dyn PageParser,
    extractor: &dyn EpisodeIdExtractor,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary> {
    let mut null = NullProgress;
    let progress: &mut dyn Progress = match progress {
        Some(p) => p,
        None => &mut null,
    };

    let mut tracked = open_ledgers(opts)?;

    loop {
        match run_pass(opts, &mut tracked, fetcher, parser, extractor, Some(&mut *progress)) {
            Ok(summary) if !opts.forever => return Ok(summary),
            Ok(_) => {}
            Err(e) if opts.forever && e.is_transient() => {
                error!(error = %e, "Pass failed; will retry");
            }
            Err(e) => return Err(e),
        }
        info!(secs = opts.forever_sleep.as_secs(), "Sleeping before next pass");
        thread::sleep(opts.forever_sleep);
    }
}

/* ---------------- Report file ---------------- */

#[derive(Serialize)]
struct EpisodeReport<'a> {
    host: &'a str,
    primary_category_id: u64,
    qualifying_category_id: u64,
    episodes: Vec<ReportedEpisode<'a>>,
    /// Qualifying phase seen, no primary awards yet.
    pending: Vec<u64>,
    /// Primary awards with no qualifying phase.
    unmatched: Vec<u64>,
}

#[derive(Serialize)]
struct ReportedEpisode<'a> {
    title: String,
    start_utc: String,
    primary_utc: String,
    end_utc: String,
    #[serde(flatten)]
    episode: &'a CorrelatedEpisode,
}

impl<'a> EpisodeReport<'a> {
    fn new(opts: &'a RunOptions, primary: u64, qualifying: u64, c: &'a Correlation) -> Self {
        let episodes = c
            .episodes
            .values()
            .map(|e| ReportedEpisode {
                title: strip_tags(&e.reason),
                start_utc: format_utc_time(e.start_timestamp),
                primary_utc: format_utc_time(e.primary_timestamp),
                end_utc: format_utc_time(e.end_timestamp),
                episode: e,
            })
            .collect();
        Self {
            host: &opts.host,
            primary_category_id: primary,
            qualifying_category_id: qualifying,
            episodes,
            pending: c.qualifying_only.keys().copied().collect(),
            unmatched: c.primary_only.keys().copied().collect(),
        }
    }
}
