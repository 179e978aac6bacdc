//! Incremental graph construction
//!
//! Nodes are keyed by id and never duplicated; the first insertion of an id
//! defines the node. Edges are deduplicated on `(source, target, kind)`.
//! Insertion order is preserved for both, which keeps compiles
//! reproducible.

use crate::codes::{code_for, ConceptCodes};
use crate::identity::{anonymous_author, work_key};
use cartograph_common::models::{
    Citation, EdgeKind, Graph, GraphEdge, GraphNode, RefIndex, WorkRecord,
};
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

#[derive(Debug)]
struct ConceptSlot {
    term: String,
    node_id: String,
    code: String,
    matches: u32,
}

#[derive(Debug, Default)]
pub struct GraphBuilder {
    nodes: IndexMap<String, GraphNode>,
    edges: IndexSet<(String, String, EdgeKind)>,
    refs: RefIndex,
    concepts: Vec<ConceptSlot>,
    codes: ConceptCodes,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a normalized concept term. Repeats are ignored.
    pub fn add_concept(&mut self, term: &str) {
        let node_id = format!("concept:{}", term);
        if self.nodes.contains_key(&node_id) {
            return;
        }

        let code = self.codes.assign(term);
        self.nodes.insert(
            node_id.clone(),
            GraphNode::concept(node_id.clone(), term, code.clone()),
        );
        self.refs.insert(code.clone(), Vec::new());
        self.concepts.push(ConceptSlot {
            term: term.to_string(),
            node_id,
            code,
            matches: 0,
        });
    }

    /// Add one enriched record: its work node (once per identity), its
    /// authors with `authored` edges, and `concept` edges for every concept
    /// occurring in the title.
    ///
    /// A record whose identity is already present only contributes authors;
    /// concept matching ran against the first record's title.
    pub fn add_work(&mut self, record: &WorkRecord, names: &HashMap<String, String>) {
        let work_id = work_key(record);
        let is_new = !self.nodes.contains_key(&work_id);

        if is_new {
            let code = code_for(&record.title, record.year);
            self.nodes
                .insert(work_id.clone(), GraphNode::work(work_id.clone(), record, code));
        }

        for author in &record.authors {
            let author_id = author
                .identifier
                .clone()
                .unwrap_or_else(|| anonymous_author(&work_id));

            if !self.nodes.contains_key(&author_id) {
                let label = author
                    .identifier
                    .as_ref()
                    .and_then(|id| names.get(id))
                    .cloned()
                    .or_else(|| {
                        let name = author.display_name.trim();
                        (!name.is_empty()).then(|| name.to_string())
                    })
                    .unwrap_or_else(|| author_id.clone());
                let code = code_for(&label, None);
                self.nodes.insert(
                    author_id.clone(),
                    GraphNode::author(author_id.clone(), label, author.identifier.clone(), code),
                );
            }

            self.push_edge(&author_id, &work_id, EdgeKind::Authored);
        }

        if is_new {
            let title = record.title.to_lowercase();
            let citation = Citation::from(record);
            let mut matched = Vec::new();

            for (index, concept) in self.concepts.iter_mut().enumerate() {
                if title.contains(concept.term.as_str()) {
                    concept.matches += 1;
                    matched.push(index);
                }
            }

            for index in matched {
                let (node_id, code) = {
                    let slot = &self.concepts[index];
                    (slot.node_id.clone(), slot.code.clone())
                };
                self.push_edge(&node_id, &work_id, EdgeKind::Concept);
                self.refs.entry(code).or_default().push(citation.clone());
            }
        }
    }

    /// Drop concept nodes matched by fewer than `min_freq` works, along
    /// with their edges. Their RefIndex key stays, emptied.
    pub fn prune_concepts(&mut self, min_freq: u32) {
        for concept in self.concepts.iter().filter(|c| c.matches < min_freq) {
            self.nodes.shift_remove(&concept.node_id);
            self.edges.retain(|(source, _, kind)| {
                !(*kind == EdgeKind::Concept && *source == concept.node_id)
            });
            if let Some(bucket) = self.refs.get_mut(&concept.code) {
                bucket.clear();
            }
        }
        self.concepts.retain(|c| c.matches >= min_freq);
    }

    fn push_edge(&mut self, source: &str, target: &str, kind: EdgeKind) {
        self.edges
            .insert((source.to_string(), target.to_string(), kind));
    }

    pub fn finish(self) -> Graph {
        Graph {
            nodes: self.nodes.into_values().collect(),
            edges: self
                .edges
                .into_iter()
                .map(|(source, target, kind)| GraphEdge::new(source, target, kind))
                .collect(),
            refs: self.refs,
        }
    }
}
