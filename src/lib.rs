// src/lib.rs

#[macro_use]
pub mod macros;

pub mod config;
pub mod core;
pub mod error;
pub mod specs;

pub mod csv;
pub mod episodes;
pub mod event;
pub mod file;
pub mod ledger;
pub mod log;
pub mod progress;
pub mod runner;
pub mod scrape;
pub mod snapshot;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};
pub use event::{Award, Event};
pub use ledger::Ledger;
