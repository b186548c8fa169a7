//! Data types for canonical graphs and stored records.

use std::borrow::Cow;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use livegraph_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag given to nodes that do not carry one.
pub const DEFAULT_NODE_TYPE: &str = "concept";
/// Type tag given to edges that do not carry one.
pub const DEFAULT_EDGE_TYPE: &str = "relationship";
/// Bucket for submissions that carry no video id.
pub const UNKNOWN_VIDEO: &str = "unknown";

fn default_edge_type() -> String {
    DEFAULT_EDGE_TYPE.to_string()
}

/// A node in a canonical graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "NodeRepr")]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

impl Node {
    /// A node whose label is its id and whose type is the default concept.
    pub fn concept(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            node_type: DEFAULT_NODE_TYPE.to_string(),
        }
    }
}

/// Accepted wire shapes for a node: a bare id or a full object.
#[derive(Deserialize)]
#[serde(untagged)]
enum NodeRepr {
    Id(String),
    Full {
        id: String,
        label: Option<String>,
        #[serde(rename = "type")]
        node_type: Option<String>,
    },
}

impl From<NodeRepr> for Node {
    fn from(repr: NodeRepr) -> Self {
        match repr {
            NodeRepr::Id(id) => Node::concept(id),
            NodeRepr::Full {
                id,
                label,
                node_type,
            } => Node {
                label: label.unwrap_or_else(|| id.clone()),
                node_type: node_type.unwrap_or_else(|| DEFAULT_NODE_TYPE.to_string()),
                id,
            },
        }
    }
}

/// A directed, labeled edge. Older clients send `from`/`to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(alias = "from")]
    pub source: String,
    #[serde(alias = "to")]
    pub target: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_edge_type")]
    pub edge_type: String,
}

impl Edge {
    pub fn relationship(
        source: impl Into<String>,
        label: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            label: label.into(),
            edge_type: default_edge_type(),
        }
    }
}

/// A `(subject, relation, object)` unit, serialized as a 3-element array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple(pub String, pub String, pub String);

impl Triple {
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self(subject.into(), relation.into(), object.into())
    }

}

/// One entry of a node, edge or triple list: the canonical shape when the
/// entry fits it, otherwise the JSON value exactly as the caller sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GraphElement<T> {
    Canonical(T),
    Opaque(Value),
}

impl<T> GraphElement<T> {
    pub fn canonical(&self) -> Option<&T> {
        match self {
            Self::Canonical(inner) => Some(inner),
            Self::Opaque(_) => None,
        }
    }
}

impl<T: DeserializeOwned> GraphElement<T> {
    /// Interpret a caller-supplied value, keeping it opaque when it does not
    /// fit the canonical shape.
    pub fn from_value(value: Value) -> Self {
        match T::deserialize(&value) {
            Ok(inner) => Self::Canonical(inner),
            Err(_) => Self::Opaque(value),
        }
    }
}

impl<T> From<T> for GraphElement<T> {
    fn from(inner: T) -> Self {
        Self::Canonical(inner)
    }
}

/// Render an opaque client value as text: strings as-is, anything else as JSON.
pub fn value_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Video context attached by the browser agent. Values are opaque and kept
/// with whatever JSON type the client used; unknown keys are kept too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption_count: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_used: Option<Value>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl VideoMetadata {
    /// Video id used for distinct-video tracking. Non-string ids are
    /// rendered as JSON text, so `42` and `"42"` share a bucket.
    pub fn video_key(&self) -> Cow<'_, str> {
        match &self.video_id {
            None | Some(Value::Null) => Cow::Borrowed(UNKNOWN_VIDEO),
            Some(id) => value_text(id),
        }
    }
}

/// Where a record's graph came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphOrigin {
    /// Built by the triple parser; edges are checked against nodes.
    Parsed,
    /// Handed over pre-built by the caller and trusted as-is.
    #[default]
    Supplied,
}

/// The `data` block of a stored record: client envelope plus canonical graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<Value>,
    #[serde(default)]
    pub metadata: VideoMetadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<Value>,
    #[serde(default)]
    pub origin: GraphOrigin,
    #[serde(default)]
    pub nodes: Vec<GraphElement<Node>>,
    #[serde(default)]
    pub edges: Vec<GraphElement<Edge>>,
    #[serde(default)]
    pub raw_triples: Vec<GraphElement<Triple>>,
}

impl GraphPayload {
    /// Check that every edge of a parsed graph points at one of its nodes.
    pub fn validate(&self) -> Result<()> {
        if self.origin == GraphOrigin::Supplied {
            return Ok(());
        }

        let ids: HashSet<&str> = self
            .nodes
            .iter()
            .filter_map(GraphElement::canonical)
            .map(|n| n.id.as_str())
            .collect();
        for element in &self.edges {
            let edge = element.canonical().ok_or_else(|| {
                Error::InvalidRecord(format!("parsed graph holds a malformed edge: {:?}", element))
            })?;
            for endpoint in [&edge.source, &edge.target] {
                if !ids.contains(endpoint.as_str()) {
                    return Err(Error::InvalidRecord(format!(
                        "edge {:?} -> {:?} references unknown node {:?}",
                        edge.source, edge.target, endpoint
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One ingestion event as retained by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// 1-based position in the all-time ingestion sequence.
    pub graph_id: u64,
    /// Server arrival time.
    pub timestamp: DateTime<Utc>,
    pub data: GraphPayload,
}
