// src/ledger.rs
//
// Durable, deduplicated record of every known award for one badge.
//
// On disk: a two-column CSV (`subject_id,utc_time`), header first, one row per
// event, only ever appended to. Reason text lives in a sibling append-only
// log (`<stem>.reasons.csv`, `subject_id,utc_time,reason`) so the ledger
// format stays two columns. In memory: the event set plus each known reason.
//
// One process, one ledger handle, one writer.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::csv::{self, Record, SEP};
use crate::error::{Error, Result};
use crate::event::{parse_time_cell, Award, Event};
use crate::file::ensure_parent;
use crate::snapshot::Snapshot;

pub const FIELD_NAMES: [&str; 2] = ["subject_id", "utc_time"];
pub const REASON_FIELD_NAMES: [&str; 3] = ["subject_id", "utc_time", "reason"];

const REASON_LOG_SUFFIX: &str = ".reasons.csv";

/// Where the reason log for the ledger at `path` lives.
pub fn reason_log_path(path: &Path) -> PathBuf {
    let mut name = path.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
    name.push(REASON_LOG_SUFFIX);
    path.with_file_name(name)
}

/* ---------------- Append-only CSV file ---------------- */

#[derive(Debug)]
struct AppendLog {
    path: PathBuf,
    file: File,
}

impl AppendLog {
    /// Open the file at `path` for appending and return its data rows.
    ///
    /// Missing or zero-length files get just the header. An unexpected header
    /// or unterminated quote is corruption; a missing final newline is added.
    fn open(path: PathBuf, header: &[&str]) -> Result<(Self, Vec<Record>)> {
        ensure_parent(&path)?;
        let mut rows = Vec::new();

        if path.exists() {
            let text = String::from_utf8(fs::read(&path)?)
                .map_err(|e| Error::corrupt_ledger(&path, None, format!("not UTF-8: {e}")))?;
            let mut records = csv::parse_records(&text, SEP)
                .map_err(|line| Error::corrupt_ledger(&path, Some(line), "unterminated quoted field"))?
                .into_iter();

            match records.next() {
                None => {
                    warn!(path = %path.display(), "File exists but is empty. Adding header row.");
                    fs::write(&path, csv::row_bytes(header, SEP))?;
                }
                Some(first) => {
                    check_header(&path, &first, header)?;
                    rows.extend(records);
                    // A row without its newline would glue onto the next append.
                    if !text.ends_with('\n') && !text.ends_with('\r') {
                        OpenOptions::new().append(true).open(&path)?.write_all(b"\n")?;
                    }
                }
            }
        } else {
            info!(path = %path.display(), "No existing file. Creating one with header.");
            fs::write(&path, csv::row_bytes(header, SEP))?;
        }

        let file = OpenOptions::new().append(true).open(&path)?;
        Ok((Self { path, file }, rows))
    }

    /// One synced write. On failure the file is cut back to its old length.
    fn append(&mut self, row: &[u8]) -> Result<()> {
        let before = self.file.metadata()?.len();

        let written = self.file.write_all(row).and_then(|_| self.file.sync_data());
        if let Err(e) = written {
            if let Err(trunc) = self.file.set_len(before) {
                warn!(path = %self.path.display(), error = %trunc, "Could not roll back partial row");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/* ---------------- Ledger ---------------- */

#[derive(Debug)]
pub struct Ledger {
    category_id: u64,
    rows: AppendLog,
    reasons: AppendLog,
    events: HashMap<Event, Option<String>>,
}

impl Ledger {
    /// Load the ledger at `path` and its reason log, creating either (header
    /// only) if missing.
    ///
    /// A zero-length file is repaired in place by writing the header. A bad
    /// header or any unreadable data row fails the whole load. Reason rows for
    /// events the ledger does not hold are ignored.
    pub fn open(category_id: u64, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let reason_path = reason_log_path(&path);

        let (rows, records) = AppendLog::open(path, &FIELD_NAMES)?;
        let mut events = HashMap::new();
        for rec in &records {
            let event = parse_event(&rows.path, category_id, rec, FIELD_NAMES.len())?;
            events.insert(event, None);
        }
        if records.len() != events.len() {
            debug!(rows = records.len(), unique = events.len(), "Ledger file holds repeated rows");
        }

        let (reasons, reason_records) = AppendLog::open(reason_path, &REASON_FIELD_NAMES)?;
        let mut with_reason = 0;
        let mut orphaned = 0;
        for rec in &reason_records {
            let event = parse_event(&reasons.path, category_id, rec, REASON_FIELD_NAMES.len())?;
            match events.get_mut(&event) {
                Some(slot) if slot.is_none() => {
                    *slot = Some(rec.fields[2].clone());
                    with_reason += 1;
                }
                Some(_) => {}
                None => orphaned += 1,
            }
        }
        if orphaned > 0 {
            debug!(orphaned, path = %reasons.path.display(), "Reason rows without a ledger row");
        }

        info!(category_id, events = events.len(), with_reason, path = %rows.path.display(), "Read ledger");
        Ok(Self { category_id, rows, reasons, events })
    }

    pub fn category_id(&self) -> u64 { self.category_id }
    pub fn path(&self) -> &Path { &self.rows.path }
    pub fn reason_log_path(&self) -> &Path { &self.reasons.path }
    pub fn len(&self) -> usize { self.events.len() }
    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    pub fn contains(&self, event: &Event) -> bool {
        self.events.contains_key(event)
    }

    /// Reason text known for `event`, if any.
    pub fn reason(&self, event: &Event) -> Option<&str> {
        self.events.get(event).and_then(|r| r.as_deref())
    }

    /// Add `event` and persist it as one row. Returns false, writing nothing,
    /// when it is already a member.
    pub fn append_if_new(&mut self, event: Event) -> Result<bool> {
        self.insert(event, None)
    }

    /// Like [`append_if_new`](Self::append_if_new), also persisting the
    /// award's reason. A known event without a reason picks up this one.
    pub fn record(&mut self, award: Award) -> Result<bool> {
        self.insert(award.event, award.reason)
    }

    fn insert(&mut self, event: Event, reason: Option<String>) -> Result<bool> {
        if event.category_id != self.category_id {
            return Err(Error::CategoryMismatch { expected: self.category_id, found: event.category_id });
        }
        if let Some(known) = self.events.get_mut(&event) {
            if let (true, Some(r)) = (known.is_none(), reason) {
                self.reasons.append(&reason_row(&event, &r))?;
                *known = Some(r);
            }
            return Ok(false);
        }
        // Reason first: a reason row without its event row is ignored on load,
        // the reverse would lose the reason.
        if let Some(r) = &reason {
            self.reasons.append(&reason_row(&event, r))?;
        }
        self.rows.append(&event_row(&event))?;
        self.events.insert(event, reason);
        Ok(true)
    }

    /// All events, oldest first; same-second awards ordered by subject.
    pub fn iter_chronological(&self) -> std::vec::IntoIter<Event> {
        let mut out: Vec<Event> = self.events.keys().copied().collect();
        out.sort_by_key(Event::chrono_key);
        out.into_iter()
    }

    /// Chronological events with their reasons attached.
    pub fn awards_chronological(&self) -> Vec<Award> {
        self.iter_chronological()
            .map(|e| Award::new(e, self.events.get(&e).cloned().flatten()))
            .collect()
    }

    /* ---------------- Snapshots ---------------- */

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::from_awards(self.category_id, self.awards_chronological())
    }

    /// Replace `path` with a full dump of this ledger.
    pub fn snapshot_save(&self, path: &Path) -> Result<()> {
        self.snapshot().write(path)
    }

    /// Open (or create) the ledger at `ledger_path` for the snapshot's category
    /// and merge the snapshot into it.
    ///
    /// This is a merge, not a restore: events already stored at `ledger_path`
    /// stay. The result equals the saved ledger only when `ledger_path` starts
    /// out empty or holds a subset of the snapshot.
    pub fn snapshot_load(snapshot_path: &Path, ledger_path: impl Into<PathBuf>) -> Result<Self> {
        let snap = Snapshot::read(snapshot_path)?;
        let mut ledger = Ledger::open(snap.category_id, ledger_path)?;
        ledger.absorb(&snap)?;
        Ok(ledger)
    }

    /// Merge a snapshot's events (and reasons). Returns how many were new.
    pub fn absorb(&mut self, snap: &Snapshot) -> Result<usize> {
        if snap.category_id != self.category_id {
            return Err(Error::CategoryMismatch { expected: self.category_id, found: snap.category_id });
        }
        let mut added = 0;
        for award in snap.awards() {
            if self.record(award)? {
                added += 1;
            }
        }
        if added > 0 {
            info!(category_id = self.category_id, added, "Ledger caught up from snapshot");
        }
        Ok(added)
    }
}

fn event_row(event: &Event) -> Vec<u8> {
    csv::row_bytes(&[event.subject_id.to_string(), event.timestamp.to_string()], SEP)
}

fn reason_row(event: &Event, reason: &str) -> Vec<u8> {
    csv::row_bytes(&[event.subject_id.to_string(), event.timestamp.to_string(), s!(reason)], SEP)
}

fn check_header(path: &Path, header: &Record, expected: &[&str]) -> Result<()> {
    let found = header.fields.iter().map(String::as_str);
    if found.ne(expected.iter().copied()) {
        return Err(Error::corrupt_ledger(
            path,
            Some(header.line),
            format!("expected field names {:?}, found {:?}", expected, header.fields),
        ));
    }
    Ok(())
}

/// Event from the first two fields of a `width`-field row.
fn parse_event(path: &Path, category_id: u64, rec: &Record, width: usize) -> Result<Event> {
    let bad = |reason: String| Error::corrupt_ledger(path, Some(rec.line), reason);

    if rec.fields.len() != width {
        return Err(bad(format!("expected {width} fields, found {}", rec.fields.len())));
    }
    let (subject, time) = (&rec.fields[0], &rec.fields[1]);
    let subject_id = subject
        .trim()
        .parse::<u64>()
        .map_err(|_| bad(format!("bad subject_id {subject:?}")))?;
    let timestamp = parse_time_cell(time).ok_or_else(|| bad(format!("bad utc_time {time:?}")))?;

    Ok(Event { category_id, subject_id, timestamp })
}
