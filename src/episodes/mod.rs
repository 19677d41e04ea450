// src/episodes/mod.rs
//! Time-windowed grouping of ledger events.
//!
//! - `group`: split a chronological stream wherever the gap between
//!   consecutive awards reaches the threshold.
//! - `extract`: pull the shared episode id out of an award's reason text.
//! - `correlate`: pair primary and qualifying episodes by that id and derive
//!   hourly series for each pair.

pub mod correlate;
pub mod extract;
pub mod group;

pub use correlate::{correlate, identify, CorrelatedEpisode, Correlation, HourlySeries, Identified};
pub use extract::{DelimitedId, EpisodeIdExtractor};
pub use group::{group, Episode};
