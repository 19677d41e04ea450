// src/log.rs
//
// Process-wide subscriber installation. Library code only emits `tracing`
// events; binaries call `init` once at startup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "badge_scrape=info";
const VERBOSE_DIRECTIVE: &str = "badge_scrape=debug";

#[derive(Clone, Debug, Default)]
pub struct LogOptions {
    pub verbose: bool,
    /// Append plain-text logs here instead of stderr.
    pub file: Option<PathBuf>,
}

/// `RUST_LOG` wins over `verbose` when set.
pub fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { VERBOSE_DIRECTIVE } else { DEFAULT_DIRECTIVE })
    })
}

pub fn init(opts: &LogOptions) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(opts.verbose));

    match &opts.file {
        Some(path) => {
            crate::file::ensure_parent(path)?;
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    }
}
