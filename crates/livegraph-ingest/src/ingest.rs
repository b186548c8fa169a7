//! Ingestion pipeline: submission → normalize → store → stats.

use std::borrow::Cow;
use std::sync::Arc;

use livegraph_core::{Error, Result};
use livegraph_store::{value_text, GraphElement, GraphRecord, GraphStore, StatsAggregator};
use tracing::{debug, info};

use crate::normalize::normalize;
use crate::submission::Submission;

/// Number of nodes/edges echoed at debug level per submission.
const LOG_PREVIEW: usize = 10;

/// Runs submissions through normalization into the store and stats.
pub struct Ingester<'a> {
    store: &'a GraphStore,
    stats: &'a StatsAggregator,
}

impl<'a> Ingester<'a> {
    pub fn new(store: &'a GraphStore, stats: &'a StatsAggregator) -> Self {
        Self { store, stats }
    }

    /// Validate and ingest a raw request body.
    pub fn ingest_bytes(&self, body: &[u8]) -> Result<Arc<GraphRecord>> {
        let submission = Submission::from_json_bytes(body)?;
        self.ingest(submission)
    }

    /// Ingest a validated submission.
    ///
    /// Everything that can fail runs before the store is touched. Stats are
    /// updated inside the append, so a reader never sees one without the other.
    pub fn ingest(&self, submission: Submission) -> Result<Arc<GraphRecord>> {
        let mode = submission.mode();
        let payload = normalize(submission);

        let meta = &payload.metadata;
        info!(
            "Graph push ({}): video={} title={:?} channel={:?} captions={}",
            mode,
            meta.video_key(),
            or_na(meta.video_title.as_ref()),
            or_na(meta.channel_name.as_ref()),
            or_na(meta.caption_count.as_ref()),
        );
        for node in payload.nodes.iter().take(LOG_PREVIEW) {
            match node {
                GraphElement::Canonical(node) => debug!("  node: {}", node.id),
                GraphElement::Opaque(value) => debug!("  node (opaque): {}", value),
            }
        }
        for edge in payload.edges.iter().take(LOG_PREVIEW) {
            match edge {
                GraphElement::Canonical(edge) => {
                    debug!("  edge: {} -[{}]-> {}", edge.source, edge.label, edge.target)
                }
                GraphElement::Opaque(value) => debug!("  edge (opaque): {}", value),
            }
        }

        let record = self
            .store
            .append_with(Some(payload), |record| self.stats.observe(&record.data.metadata))
            .map_err(|e| Error::IngestionFailure(e.to_string()))?;

        info!(
            "Stored graph {}: {} nodes, {} edges, {} triples",
            record.graph_id,
            record.data.nodes.len(),
            record.data.edges.len(),
            record.data.raw_triples.len()
        );

        Ok(record)
    }
}

fn or_na(value: Option<&serde_json::Value>) -> Cow<'_, str> {
    value.map_or(Cow::Borrowed("N/A"), value_text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn push(ingester: &Ingester<'_>, value: serde_json::Value) -> Result<Arc<GraphRecord>> {
        ingester.ingest_bytes(value.to_string().as_bytes())
    }

    #[test]
    fn test_ingest_triples() {
        let store = GraphStore::unbounded();
        let stats = StatsAggregator::new();
        let ingester = Ingester::new(&store, &stats);

        let record = push(
            &ingester,
            json!({
                "metadata": {"videoId": "v1"},
                "contentType": "ai_triples",
                "rawContent": "(a, b, c)\n(c, d, e, f)",
            }),
        )
        .unwrap();

        assert_eq!(record.graph_id, 1);
        assert_eq!(record.data.edges.len(), 3);
        assert_eq!(record.data.nodes.len(), 4);
        assert_eq!(store.len(), 1);

        let snap = stats.snapshot();
        assert_eq!(snap.total_received, 1);
        assert_eq!(snap.unique_videos, 1);
    }

    #[test]
    fn test_malformed_body_leaves_state_untouched() {
        let store = GraphStore::unbounded();
        let stats = StatsAggregator::new();
        let ingester = Ingester::new(&store, &stats);

        let err = ingester.ingest_bytes(b"").unwrap_err();
        assert!(matches!(err, Error::MalformedSubmission(_)));
        assert!(err.is_client_error());
        assert!(store.is_empty());
        assert_eq!(stats.snapshot().total_received, 0);
    }

    #[test]
    fn test_opaque_values_accepted() {
        let store = GraphStore::unbounded();
        let stats = StatsAggregator::new();
        let ingester = Ingester::new(&store, &stats);

        let pushes = [
            json!({"version": 1.2, "contentType": "ai_triples", "rawContent": "(a, b, c)"}),
            json!({
                "metadata": {"videoId": 42},
                "contentType": "ai_triples",
                "rawContent": "(a, b, c)",
            }),
            json!({
                "metadata": {"captionCount": "12"},
                "contentType": "ai_triples",
                "rawContent": "(a, b, c)",
            }),
            json!({"nodes": [{"name": "x"}], "edges": [{"src": "x"}]}),
        ];
        for (i, value) in pushes.into_iter().enumerate() {
            let record = push(&ingester, value.clone())
                .unwrap_or_else(|e| panic!("push {} rejected: {}", value, e));
            assert_eq!(record.graph_id, i as u64 + 1);
        }

        let stored = store.all();
        assert_eq!(stored[0].data.version, Some(json!(1.2)));
        assert_eq!(stored[0].data.edges.len(), 1);
        assert_eq!(stored[1].data.metadata.video_key(), "42");
        assert_eq!(stored[2].data.metadata.caption_count, Some(json!("12")));
        assert_eq!(
            stored[3].data.nodes[0],
            GraphElement::<livegraph_store::Node>::Opaque(json!({"name": "x"}))
        );

        let snap = stats.snapshot();
        assert_eq!(snap.total_received, 4);
        // "unknown" plus "42".
        assert_eq!(snap.unique_videos, 2);
    }

    #[test]
    fn test_store_and_stats_agree_under_concurrent_reads() {
        let store = GraphStore::unbounded();
        let stats = StatsAggregator::new();

        std::thread::scope(|s| {
            s.spawn(|| {
                let ingester = Ingester::new(&store, &stats);
                for _ in 0..200 {
                    push(&ingester, json!({"source": "test"})).unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..200 {
                    let (retained, total) =
                        store.read_with(|len| (len, stats.snapshot().total_received));
                    assert_eq!(retained as u64, total);
                }
            });
        });

        assert_eq!(stats.snapshot().total_received, 200);
    }

    #[test]
    fn test_sequence_ids_follow_store_length() {
        let store = GraphStore::unbounded();
        let stats = StatsAggregator::new();
        let ingester = Ingester::new(&store, &stats);

        for expected in 1..=3u64 {
            let record = push(&ingester, json!({"source": "test"})).unwrap();
            assert_eq!(record.graph_id, expected);
            assert_eq!(store.len() as u64, expected);
        }
        // Metadata-less pushes share the "unknown" bucket.
        assert_eq!(stats.snapshot().unique_videos, 1);
        assert_eq!(stats.snapshot().total_received, 3);
    }
}
