// src/cli.rs
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::eyre;

use crate::config::consts::*;
use crate::config::options::{site_categories, CategorySpec, Role, RunOptions, ScrapeOptions};
use crate::core::net::HttpFetcher;
use crate::episodes::DelimitedId;
use crate::log::{self, LogOptions};
use crate::progress::LogProgress;
use crate::runner;
use crate::specs::BadgePageParser;

/// Keep local badge ledgers in sync with a Stack Exchange site and report
/// election participation.
#[derive(Debug, Parser)]
#[command(name = "badge_scrape", version, about)]
pub struct Args {
    /// Stop at the first already-known award. Only safe if the previous run completed.
    #[arg(short = 'x', long, env = "BADGE_SCRAPE_STOP_ON_EXISTING")]
    pub stop_on_existing: bool,

    /// Skip scraping; work from the stored ledgers only.
    #[arg(short = 'n', long, env = "BADGE_SCRAPE_NO_UPDATE")]
    pub no_update: bool,

    /// Do not write snapshots or the episode report.
    #[arg(short = 'm', long, env = "BADGE_SCRAPE_NO_WRITE")]
    pub no_write: bool,

    /// Repeat passes until interrupted.
    #[arg(short = 'e', long, env = "BADGE_SCRAPE_FOREVER")]
    pub forever: bool,

    #[arg(long, env = "BADGE_SCRAPE_DATA_DIR", default_value = DATA_DIR)]
    pub data_dir: PathBuf,

    #[arg(long, env = "BADGE_SCRAPE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Badge awarded in the episode itself. Replaces the host's preset badges.
    #[arg(long, env = "BADGE_SCRAPE_PRIMARY_BADGE", requires = "qualifying_badge")]
    pub primary_badge: Option<u64>,

    /// Badge awarded in the lead-up phase. Replaces the host's preset badges.
    #[arg(long, env = "BADGE_SCRAPE_QUALIFYING_BADGE", requires = "primary_badge")]
    pub qualifying_badge: Option<u64>,

    /// Extra badge to scrape and store only. Repeatable.
    #[arg(long = "tracked-badge", value_name = "ID")]
    pub tracked_badges: Vec<u64>,

    /// Wait before every page request.
    #[arg(long, env = "BADGE_SCRAPE_INTERVAL_MS", default_value_t = REQUEST_INTERVAL_MS)]
    pub interval_ms: u64,

    /// Sleep between passes with --forever.
    #[arg(long, env = "BADGE_SCRAPE_SLEEP_SECS", default_value_t = FOREVER_SLEEP_SECS)]
    pub sleep_secs: u64,

    /// Quiet period that separates two episodes.
    #[arg(long, env = "BADGE_SCRAPE_GAP_DAYS", default_value_t = GAP_THRESHOLD_SECS / DAY_SECS,
          value_parser = clap::value_parser!(i64).range(1..))]
    pub gap_days: i64,

    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr.
    #[arg(long, env = "BADGE_SCRAPE_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Badge flags win over the host's presets; a host without presets needs them.
    fn categories(&self) -> color_eyre::Result<Vec<CategorySpec>> {
        let explicit = self.primary_badge.is_some() || !self.tracked_badges.is_empty();
        if !explicit {
            return site_categories(&self.host).ok_or_else(|| {
                eyre!("no badge ids known for {}; pass --primary-badge and --qualifying-badge", self.host)
            });
        }

        let mut out: Vec<CategorySpec> = self
            .tracked_badges
            .iter()
            .map(|id| CategorySpec::new(*id, &format!("badge-{id}"), Role::Tracked))
            .collect();
        if let (Some(p), Some(q)) = (self.primary_badge, self.qualifying_badge) {
            out.push(CategorySpec::new(p, PRIMARY_NAME, Role::Primary));
            out.push(CategorySpec::new(q, QUALIFYING_NAME, Role::Qualifying));
        }
        Ok(out)
    }

    pub fn run_options(&self) -> color_eyre::Result<RunOptions> {
        Ok(RunOptions {
            data_dir: self.data_dir.clone(),
            host: self.host.clone(),
            categories: self.categories()?,
            scrape: ScrapeOptions {
                stop_on_existing: self.stop_on_existing,
                request_interval: Duration::from_millis(self.interval_ms),
            },
            update: !self.no_update,
            write: !self.no_write,
            forever: self.forever,
            forever_sleep: Duration::from_secs(self.sleep_secs),
            gap_threshold_secs: self.gap_days * DAY_SECS,
        })
    }

    pub fn log_options(&self) -> LogOptions {
        LogOptions { verbose: self.verbose, file: self.log_file.clone() }
    }
}

pub fn run() -> color_eyre::Result<()> {
    let args = Args::parse();
    log::init(&args.log_options()).map_err(|e| eyre!("could not set up logging: {e}"))?;

    let opts = args.run_options()?;
    let mut fetcher = HttpFetcher::new(&opts.host)?;
    let parser = BadgePageParser::default();
    let extractor = DelimitedId::default();
    let mut progress = LogProgress::default();

    runner::run(&opts, &mut fetcher, &parser, &extractor, Some(&mut progress))?;
    Ok(())
}
