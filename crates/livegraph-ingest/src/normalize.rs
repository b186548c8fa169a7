//! Turns a validated submission into the canonical record body.

use livegraph_store::{Edge, GraphElement, GraphOrigin, GraphPayload, Node};
use tracing::debug;

use crate::parser::parse_triples;
use crate::submission::{Submission, SubmissionPayload};

/// Build the canonical graph for a submission.
///
/// Raw triple text is parsed and replaces anything else the client sent;
/// pre-built graphs pass through unchanged.
pub fn normalize(submission: Submission) -> GraphPayload {
    let Submission { envelope, payload } = submission;

    let mut out = GraphPayload {
        timestamp: envelope.timestamp,
        source: envelope.source,
        version: envelope.version,
        metadata: envelope.metadata,
        content_type: envelope.content_type,
        ..Default::default()
    };

    match payload {
        SubmissionPayload::Triples { raw_content } => {
            let fragment = parse_triples(&raw_content);
            if fragment.is_empty() {
                debug!("No triple groups in {} chars of raw content", raw_content.len());
            } else {
                debug!(
                    "Parsed {} chars into {} nodes, {} edges",
                    raw_content.len(),
                    fragment.nodes.len(),
                    fragment.edges.len()
                );
            }

            out.origin = GraphOrigin::Parsed;
            out.nodes = fragment
                .nodes
                .into_iter()
                .map(|id| GraphElement::Canonical(Node::concept(id)))
                .collect();
            out.edges = fragment
                .edges
                .into_iter()
                .map(|t| GraphElement::Canonical(Edge::relationship(t.0, t.1, t.2)))
                .collect();
            out.raw_triples = fragment
                .raw_triples
                .into_iter()
                .map(GraphElement::from)
                .collect();
            out.raw_content = Some(raw_content.into());
        }
        SubmissionPayload::Prebuilt {
            nodes,
            edges,
            raw_triples,
            raw_content,
        } => {
            out.origin = GraphOrigin::Supplied;
            out.nodes = nodes;
            out.edges = edges;
            out.raw_triples = raw_triples;
            out.raw_content = raw_content;
        }
    }

    out
}
