//! Triple parser for freeform model output.
//!
//! Every parenthesized group on a line is split on commas:
//! - `(s, r, o)` yields one triple,
//! - `(s, r, o, x)` yields `(s, r, o)` followed by `(o, related_to, x)`,
//! - longer groups keep the first three fields,
//! - shorter groups are skipped.
//!
//! Fields are trimmed but never dropped, so `(a,,c)` has an empty relation
//! and `( ,b,c)` has an empty subject node.

use std::collections::HashSet;

use livegraph_store::Triple;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Relation used to attach the fourth field of a group to its object.
pub const RELATED_TO: &str = "related_to";

static GROUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([^)]+)\)").unwrap());

/// Graph fragment extracted from raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TripleFragment {
    /// Distinct node ids, in first-seen order.
    pub nodes: Vec<String>,
    /// Edges as `(source, relation, target)`, in encounter order.
    pub edges: Vec<Triple>,
    /// Flattened triples for display, same order as `edges`.
    pub raw_triples: Vec<Triple>,
}

impl TripleFragment {
    /// True when no group in the text had enough fields.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[derive(Default)]
struct FragmentBuilder {
    fragment: TripleFragment,
    seen: HashSet<String>,
}

impl FragmentBuilder {
    fn add_node(&mut self, id: &str) {
        if self.seen.insert(id.to_string()) {
            self.fragment.nodes.push(id.to_string());
        }
    }

    fn push(&mut self, subject: &str, relation: &str, object: &str) {
        self.add_node(subject);
        self.add_node(object);
        let triple = Triple::new(subject, relation, object);
        self.fragment.edges.push(triple.clone());
        self.fragment.raw_triples.push(triple);
    }
}

/// Parse raw text into nodes, edges, and raw triples.
pub fn parse_triples(text: &str) -> TripleFragment {
    let mut builder = FragmentBuilder::default();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        for caps in GROUP_RE.captures_iter(line) {
            let fields: Vec<&str> = caps[1].split(',').map(str::trim).collect();
            match fields.as_slice() {
                [subject, relation, object] => builder.push(subject, relation, object),
                [subject, relation, object, extra] => {
                    builder.push(subject, relation, object);
                    builder.push(object, RELATED_TO, extra);
                }
                [subject, relation, object, ..] => builder.push(subject, relation, object),
                short => trace!("Skipping group with {} field(s): {:?}", short.len(), &caps[0]),
            }
        }
    }

    builder.fragment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_set(fragment: &TripleFragment) -> HashSet<&str> {
        fragment.nodes.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_three_fields() {
        let fragment = parse_triples("(a,b,c)");
        assert_eq!(node_set(&fragment), HashSet::from(["a", "c"]));
        assert_eq!(fragment.edges, vec![Triple::new("a", "b", "c")]);
        assert_eq!(fragment.raw_triples, vec![Triple::new("a", "b", "c")]);
    }

    #[test]
    fn test_four_fields_adds_related_to() {
        let fragment = parse_triples("(a,b,c,d)");
        assert_eq!(node_set(&fragment), HashSet::from(["a", "c", "d"]));
        let expected = vec![Triple::new("a", "b", "c"), Triple::new("c", RELATED_TO, "d")];
        assert_eq!(fragment.edges, expected);
        assert_eq!(fragment.raw_triples, expected);
    }

    #[test]
    fn test_two_fields_skipped() {
        let fragment = parse_triples("(a,b)");
        assert!(fragment.nodes.is_empty());
        assert!(fragment.edges.is_empty());
        assert!(fragment.raw_triples.is_empty());
        assert!(fragment.is_empty());
    }

    #[test]
    fn test_five_fields_truncated() {
        let fragment = parse_triples("(a,b,c,d,e)");
        assert_eq!(fragment.edges, vec![Triple::new("a", "b", "c")]);
        assert_eq!(node_set(&fragment), HashSet::from(["a", "c"]));
        assert!(!node_set(&fragment).contains("d"));
    }

    #[test]
    fn test_lines_keep_order() {
        let fragment = parse_triples("(rust, is, language)\n(tokio, runs_on, rust)\n");
        assert_eq!(
            fragment.edges,
            vec![
                Triple::new("rust", "is", "language"),
                Triple::new("tokio", "runs_on", "rust"),
            ]
        );
    }

    #[test]
    fn test_whitespace_trimmed_and_multiple_groups_per_line() {
        let fragment = parse_triples("  ( cat , chases , mouse )  and (dog, guards , house)");
        assert_eq!(
            fragment.edges,
            vec![
                Triple::new("cat", "chases", "mouse"),
                Triple::new("dog", "guards", "house"),
            ]
        );
        assert_eq!(fragment.nodes, vec!["cat", "mouse", "dog", "house"]);
    }

    #[test]
    fn test_lines_without_groups_ignored() {
        let text = "Here are the triples:\n\n(a, b, c)\nThat is all.\n()";
        let fragment = parse_triples(text);
        assert_eq!(fragment.edges.len(), 1);
    }

    #[test]
    fn test_nodes_deduplicated_edges_not() {
        let fragment = parse_triples("(a,b,c)\n(a,b,c)\n(c,d,a)");
        assert_eq!(fragment.nodes.len(), 2);
        assert_eq!(fragment.edges.len(), 3);
    }

    #[test]
    fn test_empty_fields_are_literal_ids() {
        let fragment = parse_triples("(a,,c)\n( , b, c)");
        assert_eq!(fragment.edges[0], Triple::new("a", "", "c"));
        assert_eq!(fragment.edges[1], Triple::new("", "b", "c"));
        assert!(node_set(&fragment).contains(""));
    }

    #[test]
    fn test_crlf_input() {
        let fragment = parse_triples("(a,b,c)\r\n(d,e,f)\r\n");
        assert_eq!(fragment.edges.len(), 2);
        assert_eq!(fragment.edges[1], Triple::new("d", "e", "f"));
    }
}
