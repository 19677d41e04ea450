// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use super::consts::*;
use crate::core::sanitize::file_stem;

/// What a tracked badge is used for after scraping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Awarded for taking part in the episode itself (e.g. Constituent).
    Primary,
    /// Awarded during the lead-up phase (e.g. Caucus).
    Qualifying,
    /// Scraped and persisted only.
    Tracked,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySpec {
    pub category_id: u64,
    /// Used in file names.
    pub name: String,
    pub role: Role,
}

impl CategorySpec {
    pub fn new(category_id: u64, name: &str, role: Role) -> Self {
        Self { category_id, name: s!(name), role }
    }
}

/// The badges tracked on a known site, or `None` for a host whose ids must
/// be given explicitly.
pub fn site_categories(host: &str) -> Option<Vec<CategorySpec>> {
    match host {
        SO_HOST => Some(vec![
            CategorySpec::new(SHERIFF_BADGE, "sheriff", Role::Tracked),
            CategorySpec::new(CONSTITUENT_BADGE, PRIMARY_NAME, Role::Primary),
            CategorySpec::new(CAUCUS_BADGE, QUALIFYING_NAME, Role::Qualifying),
        ]),
        MATH_HOST => Some(vec![
            CategorySpec::new(MATH_CONSTITUENT_BADGE, PRIMARY_NAME, Role::Primary),
            CategorySpec::new(MATH_CAUCUS_BADGE, QUALIFYING_NAME, Role::Qualifying),
        ]),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Stop at the first award that was already in the ledger before this run.
    /// Only safe when the ledger is known to be complete up to that award.
    pub stop_on_existing: bool,
    /// Fixed wait before every page fetch, the first one included.
    pub request_interval: Duration,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            stop_on_existing: false,
            request_interval: Duration::from_millis(REQUEST_INTERVAL_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub data_dir: PathBuf,
    pub host: String,
    pub categories: Vec<CategorySpec>,
    pub scrape: ScrapeOptions,
    /// `--no-update` clears this: work from the stored ledgers only.
    pub update: bool,
    /// `--no-write` clears this: no snapshots, no episode report.
    pub write: bool,
    pub forever: bool,
    pub forever_sleep: Duration,
    pub gap_threshold_secs: i64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIR),
            host: s!(DEFAULT_HOST),
            categories: site_categories(DEFAULT_HOST).unwrap_or_default(),
            scrape: ScrapeOptions::default(),
            update: true,
            write: true,
            forever: false,
            forever_sleep: Duration::from_secs(FOREVER_SLEEP_SECS),
            gap_threshold_secs: GAP_THRESHOLD_SECS,
        }
    }
}

impl RunOptions {
    fn stem(&self, name: &str) -> String {
        join!(&file_stem(&self.host), "-", &file_stem(name))
    }

    pub fn ledger_path(&self, cat: &CategorySpec) -> PathBuf {
        self.data_dir.join(join!(&self.stem(&cat.name), ".", LEDGER_EXT))
    }

    pub fn snapshot_path(&self, cat: &CategorySpec) -> PathBuf {
        self.data_dir.join(join!(&self.stem(&cat.name), ".", SNAPSHOT_EXT))
    }

    pub fn episode_report_path(&self) -> PathBuf {
        self.data_dir.join(self.stem(EPISODE_REPORT_SUFFIX))
    }
}
