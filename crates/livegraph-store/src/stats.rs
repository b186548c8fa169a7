//! Running ingestion statistics.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::types::VideoMetadata;

/// Consistent view of the running counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_received: u64,
    pub unique_videos: usize,
    pub start_time: DateTime<Utc>,
}

/// Thread-safe counters updated once per successful ingestion.
pub struct StatsAggregator {
    inner: Mutex<StatsInner>,
    start_time: DateTime<Utc>,
}

#[derive(Default)]
struct StatsInner {
    total: u64,
    videos: HashSet<String>,
}

impl StatsAggregator {
    /// Start counting from now.
    pub fn new() -> Self {
        Self::started_at(Utc::now())
    }

    pub fn started_at(start_time: DateTime<Utc>) -> Self {
        Self {
            inner: Mutex::new(StatsInner::default()),
            start_time,
        }
    }

    /// Record one ingested submission.
    pub fn observe(&self, metadata: &VideoMetadata) {
        let key = metadata.video_key();
        let mut inner = self.inner.lock();
        inner.total += 1;
        if !inner.videos.contains(key.as_ref()) {
            inner.videos.insert(key.into_owned());
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        StatsSnapshot {
            total_received: inner.total,
            unique_videos: inner.videos.len(),
            start_time: self.start_time,
        }
    }

    /// Time elapsed since the aggregator was created.
    pub fn uptime(&self) -> chrono::Duration {
        Utc::now() - self.start_time
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a duration as `H:MM:SS`, prefixed with whole days when present.
pub fn format_uptime(uptime: chrono::Duration) -> String {
    let total = uptime.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    match days {
        0 => format!("{}:{:02}:{:02}", hours, minutes, seconds),
        1 => format!("1 day, {}:{:02}:{:02}", hours, minutes, seconds),
        d => format!("{} days, {}:{:02}:{:02}", d, hours, minutes, seconds),
    }
}
