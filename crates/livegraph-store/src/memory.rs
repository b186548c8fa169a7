//! In-memory, append-only graph record store with a retention policy.
//!
//! Appends take the write lock only long enough to assign the sequence
//! position and timestamp, push/evict, and run the caller's commit hook.
//! Readers take the read lock and clone `Arc`s, so a query never observes a
//! half-built record.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use livegraph_core::{Error, RetentionPolicy, Result};
use parking_lot::RwLock;
use tracing::debug;

use crate::types::{GraphPayload, GraphRecord};

/// Thread-safe bounded history of ingested graphs.
pub struct GraphStore {
    inner: RwLock<StoreInner>,
    retention: RetentionPolicy,
}

struct StoreInner {
    records: VecDeque<Arc<GraphRecord>>,
    /// All-time number of appends; also the last assigned position.
    appended: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl GraphStore {
    /// Create an empty store with the given retention policy.
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                records: VecDeque::new(),
                appended: 0,
                last_timestamp: None,
            }),
            retention,
        }
    }

    /// Create an empty store that never evicts.
    pub fn unbounded() -> Self {
        Self::new(RetentionPolicy::Unbounded)
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Append a payload, returning the stored record.
    ///
    /// `None` and payloads that fail validation are rejected with
    /// [`Error::InvalidRecord`] before anything is mutated.
    pub fn append(&self, payload: Option<GraphPayload>) -> Result<Arc<GraphRecord>> {
        self.append_with(payload, |_| {})
    }

    /// Like [`append`](Self::append), but runs `on_commit` with the new record
    /// before the write lock is released. Readers going through
    /// [`read_with`](Self::read_with) see the append and whatever `on_commit`
    /// did as one step.
    pub fn append_with<F>(
        &self,
        payload: Option<GraphPayload>,
        on_commit: F,
    ) -> Result<Arc<GraphRecord>>
    where
        F: FnOnce(&GraphRecord),
    {
        let payload =
            payload.ok_or_else(|| Error::InvalidRecord("record is absent".to_string()))?;
        payload.validate()?;

        let mut inner = self.inner.write();

        let now = Utc::now();
        let timestamp = match inner.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        let graph_id = inner.appended + 1;

        let record = Arc::new(GraphRecord {
            graph_id,
            timestamp,
            data: payload,
        });

        inner.appended = graph_id;
        inner.last_timestamp = Some(timestamp);
        inner.records.push_back(record.clone());

        if let Some(limit) = self.retention.limit() {
            while inner.records.len() > limit {
                if let Some(evicted) = inner.records.pop_front() {
                    debug!("Evicted graph {} (retention {})", evicted.graph_id, limit);
                }
            }
        }

        on_commit(&record);
        Ok(record)
    }

    /// Run `f` with the retained count while appends are held off.
    pub fn read_with<R>(&self, f: impl FnOnce(usize) -> R) -> R {
        let inner = self.inner.read();
        f(inner.records.len())
    }

    /// The last `limit` retained records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<Arc<GraphRecord>> {
        let inner = self.inner.read();
        let skip = inner.records.len().saturating_sub(limit);
        inner.records.iter().skip(skip).cloned().collect()
    }

    /// Every retained record, oldest first.
    pub fn all(&self) -> Vec<Arc<GraphRecord>> {
        self.inner.read().records.iter().cloned().collect()
    }

    /// Number of currently retained records.
    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Edge, GraphOrigin, Node, Triple, VideoMetadata};
    use std::num::NonZeroUsize;

    fn payload(video: &str) -> GraphPayload {
        GraphPayload {
            metadata: VideoMetadata {
                video_id: Some(video.into()),
                ..Default::default()
            },
            origin: GraphOrigin::Parsed,
            nodes: vec![Node::concept("a").into(), Node::concept("c").into()],
            edges: vec![Edge::relationship("a", "b", "c").into()],
            raw_triples: vec![Triple::new("a", "b", "c").into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_append_assigns_positions() {
        let store = GraphStore::unbounded();
        let first = store.append(Some(payload("v1"))).unwrap();
        let second = store.append(Some(payload("v2"))).unwrap();

        assert_eq!(first.graph_id, 1);
        assert_eq!(second.graph_id, 2);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_absent_record_rejected() {
        let store = GraphStore::unbounded();
        let err = store.append(None).unwrap_err();
        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_invalid_parsed_record_rejected() {
        let store = GraphStore::unbounded();
        let mut bad = payload("v1");
        bad.edges.push(Edge::relationship("a", "b", "ghost").into());

        assert!(store.append(Some(bad)).is_err());
        assert!(store.is_empty());

        // The next good record still gets position 1.
        let ok = store.append(Some(payload("v1"))).unwrap();
        assert_eq!(ok.graph_id, 1);
    }

    #[test]
    fn test_recent_returns_tail_ascending() {
        let store = GraphStore::unbounded();
        for i in 0..5 {
            store.append(Some(payload(&format!("v{}", i)))).unwrap();
        }

        let recent = store.recent(2);
        let ids: Vec<u64> = recent.iter().map(|r| r.graph_id).collect();
        assert_eq!(ids, vec![4, 5]);
        assert!(recent[0].timestamp <= recent[1].timestamp);

        assert_eq!(store.recent(100).len(), 5);
        assert!(store.recent(0).is_empty());
        assert_eq!(store.all().len(), 5);
    }

    #[test]
    fn test_retention_evicts_oldest() {
        let store = GraphStore::new(RetentionPolicy::MaxRecords(NonZeroUsize::new(3).unwrap()));
        for i in 0..7 {
            store.append(Some(payload(&format!("v{}", i)))).unwrap();
        }

        assert_eq!(store.len(), 3);
        assert_eq!(store.retention().limit(), Some(3));
        let ids: Vec<u64> = store.all().iter().map(|r| r.graph_id).collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[test]
    fn test_concurrent_appends_unique_positions() {
        let store = GraphStore::unbounded();
        let threads = 8;
        let per_thread = 25;

        let mut ids: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let store = &store;
                    s.spawn(move || {
                        (0..per_thread)
                            .map(|i| {
                                store
                                    .append(Some(payload(&format!("v{}-{}", t, i))))
                                    .unwrap()
                                    .graph_id
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        ids.sort_unstable();
        let expected: Vec<u64> = (1..=(threads * per_thread) as u64).collect();
        assert_eq!(ids, expected);

        let stored = store.all();
        assert!(stored.windows(2).all(|w| w[0].graph_id < w[1].graph_id));
        assert!(stored.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_commit_hook_runs_once_per_append() {
        let store = GraphStore::unbounded();
        let mut seen = Vec::new();

        let record = store
            .append_with(Some(payload("v1")), |r| seen.push(r.graph_id))
            .unwrap();
        assert_eq!(seen, vec![record.graph_id]);

        let mut bad = payload("v2");
        bad.edges.push(Edge::relationship("a", "b", "ghost").into());
        assert!(store.append_with(Some(bad), |r| seen.push(r.graph_id)).is_err());
        assert!(store.append_with(None, |r| seen.push(r.graph_id)).is_err());
        assert_eq!(seen, vec![1]);

        assert_eq!(store.read_with(|len| len), 1);
    }

    #[test]
    fn test_recent_round_trip_preserves_content() {
        let store = GraphStore::unbounded();
        let original = payload("roundtrip");
        store.append(Some(original.clone())).unwrap();

        let json = serde_json::to_string(&*store.recent(1)[0]).unwrap();
        let back: GraphRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data.nodes, original.nodes);
        assert_eq!(back.data.edges, original.edges);
        assert_eq!(back.data.raw_triples, original.raw_triples);
        assert_eq!(back.graph_id, 1);
    }
}
