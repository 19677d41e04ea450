// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Ledger file exists but its header or a data row is unreadable.
    #[error("corrupt ledger {}{}: {reason}", .path.display(), fmt_row(.row))]
    CorruptLedger {
        path: PathBuf,
        row: Option<usize>,
        reason: String,
    },

    #[error("corrupt snapshot {}: {reason}", .path.display())]
    CorruptSnapshot { path: PathBuf, reason: String },

    #[error("event of category {found} offered to the category {expected} ledger")]
    CategoryMismatch { expected: u64, found: u64 },

    #[error("fetch failed for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("page {page} could not be parsed: {reason}")]
    Parse { page: u32, reason: String },

    /// An award inside an episode has no reason text to read an id from.
    #[error(
        "award to subject {subject_id} at {timestamp} in category {category_id} episode \
         ({start}..{end}) has no stored reason; rescrape without early stop or restore a snapshot"
    )]
    MissingReason {
        category_id: u64,
        start: i64,
        end: i64,
        subject_id: u64,
        timestamp: i64,
    },

    #[error(
        "inconsistent episode in category {category_id} ({start}..{end}): \
         expected reason {expected:?}, found {found:?}"
    )]
    InconsistentEpisode {
        category_id: u64,
        start: i64,
        end: i64,
        expected: String,
        found: String,
    },

    #[error("no episode id in category {category_id} episode ({start}..{end}), reason {reason:?}")]
    UnparsableEpisodeId {
        category_id: u64,
        start: i64,
        end: i64,
        reason: String,
    },

    #[error("episode id {episode_id} appears in more than one episode of category {category_id}")]
    DuplicateEpisodeId { category_id: u64, episode_id: u64 },

    #[error("cannot group an empty event stream")]
    EmptyInput,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn fmt_row(row: &Option<usize>) -> String {
    match row {
        Some(r) => format!(" (row {r})"),
        None => s!(),
    }
}

impl Error {
    pub(crate) fn corrupt_ledger(path: &std::path::Path, row: Option<usize>, reason: impl Into<String>) -> Self {
        Error::CorruptLedger { path: path.to_path_buf(), row, reason: reason.into() }
    }

    /// Only transport failures may be waited out by a forever loop;
    /// everything else (integrity, parse, local IO) aborts it.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        Error::Transport { url, message: err.to_string() }
    }
}
