//! Append-only activity log, one JSON line per accepted submission.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use livegraph_core::Result;
use livegraph_store::{GraphOrigin, GraphRecord};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;

pub struct ActivityLog {
    path: PathBuf,
    file: Mutex<File>,
}

#[derive(Serialize)]
struct ActivityEntry<'a> {
    graph_id: u64,
    timestamp: DateTime<Utc>,
    video_id: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    video_title: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a Value>,
    origin: GraphOrigin,
    nodes: usize,
    edges: usize,
    raw_triples: usize,
}

impl ActivityLog {
    /// Open (or create) the log file in append mode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line for a stored record.
    pub fn record(&self, record: &GraphRecord) -> Result<()> {
        let data = &record.data;
        let entry = ActivityEntry {
            graph_id: record.graph_id,
            timestamp: record.timestamp,
            video_id: data.metadata.video_key(),
            video_title: data.metadata.video_title.as_ref(),
            source: data.source.as_ref(),
            origin: data.origin,
            nodes: data.nodes.len(),
            edges: data.edges.len(),
            raw_triples: data.raw_triples.len(),
        };

        let line = serde_json::to_string(&entry)?;
        let mut file = self.file.lock();
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
