// src/config/consts.rs

// Net config
pub const DEFAULT_HOST: &str = SO_HOST;
pub const USER_AGENT: &str = concat!("badge_scrape/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TIMEOUT_SECS: u64 = 15;

// Scrape
pub const REQUEST_INTERVAL_MS: u64 = 2_000;

// Local store
pub const DATA_DIR: &str = "data";
pub const LEDGER_EXT: &str = "csv";
pub const SNAPSHOT_EXT: &str = "json";
pub const EPISODE_REPORT_SUFFIX: &str = "episodes.json";

// Badges. Ids differ per site.
pub const SO_HOST: &str = "stackoverflow.com";
pub const SHERIFF_BADGE: u64 = 3109;
pub const CONSTITUENT_BADGE: u64 = 1974;
pub const CAUCUS_BADGE: u64 = 1973;

pub const MATH_HOST: &str = "math.stackexchange.com";
pub const MATH_CONSTITUENT_BADGE: u64 = 208;
pub const MATH_CAUCUS_BADGE: u64 = 207;

pub const PRIMARY_NAME: &str = "constituent";
pub const QUALIFYING_NAME: &str = "caucus";

// Episodes
pub const DAY_SECS: i64 = 24 * 60 * 60;
pub const GAP_THRESHOLD_SECS: i64 = 7 * DAY_SECS;
pub const HOUR_SECS: i64 = 60 * 60;
pub const MAX_SERIES_HOURS: usize = 5 * 366 * 24;
pub const EPISODE_ID_MARKER: &str = "/election/";
pub const EPISODE_ID_TERMINATOR: char = '"';

// Forever mode
pub const FOREVER_SLEEP_SECS: u64 = 5 * 60;
