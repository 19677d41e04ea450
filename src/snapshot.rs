// src/snapshot.rs
//
// Whole-ledger JSON dump. Unlike the CSV ledger it also carries each award's
// reason text, so grouping and correlation can run from a snapshot alone.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::event::{parse_utc_time, Award, Event};
use crate::file::write_json_replace;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub category_id: u64,
    pub instances: Vec<Instance>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub subject_id: u64,
    pub timestamp: i64,
    /// Same instant as `timestamp`, in the listing's text format.
    pub utc_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Snapshot {
    pub fn from_awards(category_id: u64, awards: impl IntoIterator<Item = Award>) -> Self {
        let instances = awards
            .into_iter()
            .map(|a| Instance {
                subject_id: a.event.subject_id,
                timestamp: a.event.timestamp,
                utc_time: a.event.utc_time(),
                reason: a.reason,
            })
            .collect();
        Self { category_id, instances }
    }

    pub fn awards(&self) -> impl Iterator<Item = Award> + '_ {
        self.instances.iter().map(|i| {
            Award::new(Event::new(self.category_id, i.subject_id, i.timestamp), i.reason.clone())
        })
    }

    /// Write to a sibling temp file, then rename over `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        write_json_replace(path, self, false)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let snap: Snapshot = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| Error::CorruptSnapshot { path: path.to_path_buf(), reason: e.to_string() })?;
        snap.validate(path)?;
        Ok(snap)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        for (i, inst) in self.instances.iter().enumerate() {
            if parse_utc_time(&inst.utc_time) != Some(inst.timestamp) {
                return Err(Error::CorruptSnapshot {
                    path: path.to_path_buf(),
                    reason: format!(
                        "instance {i}: utc_time {:?} does not match timestamp {}",
                        inst.utc_time, inst.timestamp
                    ),
                });
            }
        }
        Ok(())
    }
}
