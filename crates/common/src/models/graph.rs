use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::work::WorkRecord;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Author,
    Work,
    Concept,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// author -> work
    Authored,
    /// concept -> work
    Concept,
    /// author <-> author, one edge per unordered pair
    Coauthor,
    /// earlier work -> later work
    Influences,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

impl GraphNode {
    pub fn concept(id: impl Into<String>, term: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Concept,
            label: term.into(),
            year: None,
            url: None,
            code: Some(code.into()),
            orcid: None,
        }
    }

    pub fn work(id: impl Into<String>, record: &WorkRecord, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Work,
            label: record.title.clone(),
            year: record.year,
            url: record.url.clone(),
            code: Some(code.into()),
            orcid: None,
        }
    }

    pub fn author(
        id: impl Into<String>,
        label: impl Into<String>,
        orcid: Option<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            node_type: NodeType::Author,
            label: label.into(),
            year: None,
            url: None,
            code: Some(code.into()),
            orcid,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,

    /// Shared-work count, set on `coauthor` edges only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
}

impl GraphEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            weight: None,
        }
    }

    pub fn weighted(mut self, weight: u32) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Whether this edge joins `a` and `b` in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Lightweight citation shown under a concept code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Citation {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl From<&WorkRecord> for Citation {
    fn from(record: &WorkRecord) -> Self {
        Self {
            title: record.title.clone(),
            url: record.url.clone(),
            doi: record.doi.clone(),
            year: record.year,
        }
    }
}

/// Concept code -> citations, in insertion order
pub type RefIndex = IndexMap<String, Vec<Citation>>;

/// Compiled cartography. A disposable snapshot; nothing here outlives the
/// compile call that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Graph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub refs: RefIndex,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.node_type == node_type)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_wire_format() {
        let node = GraphNode::concept("concept:affect", "affect", "#AFF");
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "concept:affect", "type": "concept", "label": "affect", "code": "#AFF" })
        );
    }

    #[test]
    fn test_edge_wire_format() {
        let edge = GraphEdge::new("a", "b", EdgeKind::Coauthor).weighted(2);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "source": "a", "target": "b", "kind": "coauthor", "weight": 2 })
        );
        assert!(edge.connects("b", "a"));
    }

    #[test]
    fn test_refs_keep_insertion_order() {
        let mut graph = Graph::default();
        graph.refs.insert("#SMO".into(), Vec::new());
        graph.refs.insert("#AFF".into(), Vec::new());
        let json = serde_json::to_string(&graph).unwrap();
        assert_eq!(json, r##"{"nodes":[],"edges":[],"refs":{"#SMO":[],"#AFF":[]}}"##);
    }
}
