// src/episodes/group.rs
use serde::Serialize;

use crate::error::{Error, Result};
use crate::event::Event;

/// A maximal run of events whose consecutive timestamps are closer than the
/// gap threshold. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Episode {
    events: Vec<Event>,
}

impl Episode {
    fn starting_with(event: Event) -> Self {
        Self { events: vec![event] }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn start_timestamp(&self) -> i64 {
        self.events.first().map_or(0, |e| e.timestamp)
    }

    pub fn end_timestamp(&self) -> i64 {
        self.events.last().map_or(0, |e| e.timestamp)
    }
}

/// Partition chronologically ordered `events` into episodes.
///
/// An event joins the current episode when it lands strictly less than
/// `gap_threshold_secs` after that episode's last event; otherwise it opens a
/// new one. An empty input has no partition and is an error.
pub fn group<I>(events: I, gap_threshold_secs: i64) -> Result<Vec<Episode>>
where
    I: IntoIterator<Item = Event>,
{
    let mut episodes: Vec<Episode> = Vec::new();

    for event in events {
        match episodes.last_mut() {
            Some(current)
                if event.timestamp < current.end_timestamp().saturating_add(gap_threshold_secs) =>
            {
                current.events.push(event);
            }
            _ => episodes.push(Episode::starting_with(event)),
        }
    }

    if episodes.is_empty() {
        return Err(Error::EmptyInput);
    }
    Ok(episodes)
}
