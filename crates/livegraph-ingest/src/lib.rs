//! Live Graph Ingest: triple parsing, submission validation, normalization, ingestion.

pub mod ingest;
pub mod normalize;
pub mod parser;
pub mod submission;

pub use ingest::Ingester;
pub use normalize::normalize;
pub use parser::{parse_triples, TripleFragment, RELATED_TO};
pub use submission::{Envelope, Submission, SubmissionPayload, AI_TRIPLES};
