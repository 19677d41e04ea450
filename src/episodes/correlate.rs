// src/episodes/correlate.rs
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use super::extract::EpisodeIdExtractor;
use super::group::{group, Episode};
use crate::config::consts::{HOUR_SECS, MAX_SERIES_HOURS};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::ledger::Ledger;

/// An episode whose members share one reason, and the id read from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identified {
    pub episode_id: u64,
    pub reason: String,
    pub episode: Episode,
}

/// A primary episode paired with the qualifying episode that led up to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CorrelatedEpisode {
    pub episode_id: u64,
    pub reason: String,
    /// First qualifying award.
    pub start_timestamp: i64,
    /// First primary award.
    pub primary_timestamp: i64,
    /// Later of the last qualifying award and the first primary award.
    pub end_timestamp: i64,
    pub primary_count: usize,
    pub qualifying_count: usize,
    pub series: HourlySeries,
    #[serde(skip)]
    pub primary: Episode,
    #[serde(skip)]
    pub qualifying: Episode,
}

/// Per-hour award counts from the qualifying start, one bucket per hour
/// through the last award of either episode (at most `MAX_SERIES_HOURS`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HourlySeries {
    pub qualifying_per_hour: Vec<u32>,
    pub primary_per_hour: Vec<u32>,
    pub qualifying_cumulative: Vec<u32>,
    pub primary_cumulative: Vec<u32>,
    /// Bucket holding the first primary award.
    pub first_primary_hour: Option<usize>,
    /// Awards before the qualifying start or past the last bucket.
    pub out_of_range: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Correlation {
    pub episodes: BTreeMap<u64, CorrelatedEpisode>,
    /// Ids with a primary episode but no qualifying one.
    pub primary_only: BTreeMap<u64, Identified>,
    /// Ids with a qualifying episode but no primary one (typically still running).
    pub qualifying_only: BTreeMap<u64, Identified>,
}

impl Correlation {
    /// Newest fully paired episode.
    pub fn latest(&self) -> Option<&CorrelatedEpisode> {
        self.episodes.values().max_by_key(|e| e.start_timestamp)
    }
}

/// Group `events` (chronological) into episodes and key each by the id in
/// its members' shared reason.
///
/// No events means no episodes. A member without a reason is reported before
/// any disagreement on reason text. Disagreeing members, a reason without an
/// id, and one id on two episodes are integrity errors too.
pub fn identify<'r, F>(
    category_id: u64,
    events: Vec<Event>,
    reason_of: F,
    gap_threshold_secs: i64,
    extractor: &dyn EpisodeIdExtractor,
) -> Result<BTreeMap<u64, Identified>>
where
    F: Fn(&Event) -> Option<&'r str>,
{
    let mut out = BTreeMap::new();
    if events.is_empty() {
        return Ok(out);
    }

    for episode in group(events, gap_threshold_secs)? {
        let (start, end) = (episode.start_timestamp(), episode.end_timestamp());

        let reasons = episode
            .events()
            .iter()
            .map(|event| {
                reason_of(event).ok_or_else(|| Error::MissingReason {
                    category_id,
                    start,
                    end,
                    subject_id: event.subject_id,
                    timestamp: event.timestamp,
                })
            })
            .collect::<Result<Vec<&str>>>()?;
        let Some(&reason) = reasons.first() else { continue };
        if let Some(found) = reasons.iter().find(|r| **r != reason) {
            return Err(Error::InconsistentEpisode {
                category_id,
                start,
                end,
                expected: s!(reason),
                found: s!(*found),
            });
        }

        let episode_id = extractor
            .extract(reason)
            .ok_or_else(|| Error::UnparsableEpisodeId { category_id, start, end, reason: s!(reason) })?;

        if out.contains_key(&episode_id) {
            return Err(Error::DuplicateEpisodeId { category_id, episode_id });
        }
        debug!(category_id, episode_id, members = episode.len(), "Identified episode");
        out.insert(episode_id, Identified { episode_id, reason: s!(reason), episode });
    }

    Ok(out)
}

/// Pair the episodes of two ledgers by shared episode id.
pub fn correlate(
    primary: &Ledger,
    qualifying: &Ledger,
    gap_threshold_secs: i64,
    extractor: &dyn EpisodeIdExtractor,
) -> Result<Correlation> {
    let mut primary_eps = identify(
        primary.category_id(),
        primary.iter_chronological().collect(),
        |e| primary.reason(e),
        gap_threshold_secs,
        extractor,
    )?;
    let qualifying_eps = identify(
        qualifying.category_id(),
        qualifying.iter_chronological().collect(),
        |e| qualifying.reason(e),
        gap_threshold_secs,
        extractor,
    )?;

    let mut out = Correlation::default();
    for (id, q) in qualifying_eps {
        match primary_eps.remove(&id) {
            Some(p) => {
                out.episodes.insert(id, pair(p, q));
            }
            None => {
                out.qualifying_only.insert(id, q);
            }
        }
    }
    out.primary_only = primary_eps;
    Ok(out)
}

fn pair(primary: Identified, qualifying: Identified) -> CorrelatedEpisode {
    let p = primary.episode;
    let q = qualifying.episode;

    let start_timestamp = q.start_timestamp();
    let primary_timestamp = p.start_timestamp();
    let end_timestamp = q.end_timestamp().max(primary_timestamp);
    let series = hourly_series(start_timestamp, &q, &p);

    CorrelatedEpisode {
        episode_id: qualifying.episode_id,
        reason: qualifying.reason,
        start_timestamp,
        primary_timestamp,
        end_timestamp,
        primary_count: p.len(),
        qualifying_count: q.len(),
        series,
        primary: p,
        qualifying: q,
    }
}

fn hourly_series(start: i64, qualifying: &Episode, primary: &Episode) -> HourlySeries {
    let last = qualifying.end_timestamp().max(primary.end_timestamp());
    let span_hours = last.saturating_sub(start).max(0) / HOUR_SECS;
    let hours = (span_hours as u64).min(MAX_SERIES_HOURS as u64 - 1) as usize + 1;
    if hours == MAX_SERIES_HOURS {
        warn!(start, last, "Episode window truncated to {MAX_SERIES_HOURS} hours");
    }

    let mut series = HourlySeries {
        qualifying_per_hour: vec![0; hours],
        primary_per_hour: vec![0; hours],
        ..HourlySeries::default()
    };

    for e in qualifying.events() {
        match bucket(start, e.timestamp, hours) {
            Some(h) => series.qualifying_per_hour[h] += 1,
            None => series.out_of_range += 1,
        }
    }
    for e in primary.events() {
        match bucket(start, e.timestamp, hours) {
            Some(h) => {
                series.primary_per_hour[h] += 1;
                series.first_primary_hour = Some(series.first_primary_hour.map_or(h, |f| f.min(h)));
            }
            None => series.out_of_range += 1,
        }
    }
    if series.out_of_range > 0 {
        debug!(start, out_of_range = series.out_of_range, "Ignoring awards outside the episode window");
    }

    series.qualifying_cumulative = cumulative(&series.qualifying_per_hour);
    series.primary_cumulative = cumulative(&series.primary_per_hour);
    series
}

fn bucket(start: i64, ts: i64, hours: usize) -> Option<usize> {
    let offset = ts.saturating_sub(start);
    if offset < 0 {
        return None;
    }
    let h = (offset / HOUR_SECS) as usize;
    (h < hours).then_some(h)
}

pub fn cumulative(xs: &[u32]) -> Vec<u32> {
    xs.iter()
        .scan(0u32, |n, &x| {
            *n += x;
            Some(*n)
        })
        .collect()
}
