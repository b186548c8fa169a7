//! Submission boundary: validates the pushed JSON body and classifies it
//! into one of the two ingestion modes.

use livegraph_core::{Error, Result};
use livegraph_store::{Edge, GraphElement, Node, Triple, VideoMetadata};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// `contentType` value announcing raw model output in `rawContent`.
pub const AI_TRIPLES: &str = "ai_triples";

/// Wire shape of a push. Every field is optional and kept as raw JSON until
/// classification, so no field value can fail the whole submission.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmission {
    timestamp: Option<Value>,
    source: Option<Value>,
    version: Option<Value>,
    metadata: Option<Value>,
    content_type: Option<Value>,
    raw_content: Option<Value>,
    nodes: Option<Value>,
    edges: Option<Value>,
    raw_triples: Option<Value>,
}

/// Client-provided context that travels with the graph unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    pub timestamp: Option<Value>,
    pub source: Option<Value>,
    pub version: Option<Value>,
    pub metadata: VideoMetadata,
    pub content_type: Option<Value>,
}

/// The two ways a client can hand over a graph.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionPayload {
    /// Raw model output to run through the triple parser.
    Triples { raw_content: String },
    /// A graph the client already built; trusted as-is.
    Prebuilt {
        nodes: Vec<GraphElement<Node>>,
        edges: Vec<GraphElement<Edge>>,
        raw_triples: Vec<GraphElement<Triple>>,
        raw_content: Option<Value>,
    },
}

/// A validated push, ready for normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub envelope: Envelope,
    pub payload: SubmissionPayload,
}

impl Submission {
    /// Validate a request body.
    ///
    /// Empty bodies, invalid JSON, and anything other than a non-empty object
    /// are [`Error::MalformedSubmission`]. The object's field values are
    /// never a reason to reject it.
    pub fn from_json_bytes(body: &[u8]) -> Result<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::MalformedSubmission("No data received".into()));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| Error::MalformedSubmission(format!("Invalid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Validate an already-decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        match &value {
            Value::Object(map) if map.is_empty() => {
                return Err(Error::MalformedSubmission("No data received".into()));
            }
            Value::Object(_) => {}
            _ => {
                return Err(Error::MalformedSubmission(
                    "Submission must be a JSON object".into(),
                ));
            }
        }

        let raw: RawSubmission = serde_json::from_value(value)
            .map_err(|e| Error::MalformedSubmission(format!("Invalid submission: {}", e)))?;
        Ok(Self::classify(raw))
    }

    fn classify(raw: RawSubmission) -> Self {
        let envelope = Envelope {
            timestamp: raw.timestamp,
            source: raw.source,
            version: raw.version,
            metadata: metadata(raw.metadata),
            content_type: raw.content_type,
        };

        let is_triples =
            envelope.content_type.as_ref().and_then(Value::as_str) == Some(AI_TRIPLES);
        let payload = match raw.raw_content {
            Some(Value::String(raw_content)) if is_triples && !raw_content.is_empty() => {
                SubmissionPayload::Triples { raw_content }
            }
            raw_content => SubmissionPayload::Prebuilt {
                nodes: elements(raw.nodes),
                edges: elements(raw.edges),
                raw_triples: elements(raw.raw_triples),
                raw_content,
            },
        };

        Self { envelope, payload }
    }

    /// Short name of the ingestion mode, for logging.
    pub fn mode(&self) -> &'static str {
        match self.payload {
            SubmissionPayload::Triples { .. } => AI_TRIPLES,
            SubmissionPayload::Prebuilt { .. } => "prebuilt",
        }
    }
}

fn metadata(value: Option<Value>) -> VideoMetadata {
    match value {
        None | Some(Value::Null) => VideoMetadata::default(),
        Some(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        Some(other) => {
            warn!("Ignoring metadata that is not an object: {}", other);
            VideoMetadata::default()
        }
    }
}

/// A caller-supplied list. A lone non-list value is kept as a single opaque
/// entry.
fn elements<T: DeserializeOwned>(value: Option<Value>) -> Vec<GraphElement<T>> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.into_iter().map(GraphElement::from_value).collect(),
        Some(other) => vec![GraphElement::Opaque(other)],
    }
}
