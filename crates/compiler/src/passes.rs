//! Mode-specific derived edges
//!
//! Both passes read the base graph and return new edges in a reproducible
//! order; neither touches nodes.

use cartograph_common::models::{EdgeKind, GraphEdge, GraphNode, NodeType};
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// One `coauthor` edge per unordered pair of authors sharing at least one
/// work, weighted by the number of works they share.
///
/// Orientation follows first appearance: the author credited earlier on the
/// first shared work is the source.
pub fn coauthor_edges(edges: &[GraphEdge]) -> Vec<GraphEdge> {
    let mut by_work: IndexMap<&str, Vec<&str>> = IndexMap::new();
    for edge in edges.iter().filter(|e| e.kind == EdgeKind::Authored) {
        let authors = by_work.entry(edge.target.as_str()).or_default();
        if !authors.contains(&edge.source.as_str()) {
            authors.push(edge.source.as_str());
        }
    }

    let mut pairs: IndexMap<(&str, &str), (&str, &str, u32)> = IndexMap::new();
    for authors in by_work.values() {
        for (i, &a) in authors.iter().enumerate() {
            for &b in &authors[i + 1..] {
                let key = if a < b { (a, b) } else { (b, a) };
                pairs.entry(key).or_insert((a, b, 0)).2 += 1;
            }
        }
    }

    pairs
        .into_values()
        .map(|(source, target, shared)| {
            GraphEdge::new(source, target, EdgeKind::Coauthor).weighted(shared)
        })
        .collect()
}

/// `influences` edges from every dated work to every strictly later dated
/// work that shares at least one concept with it.
///
/// This is a co-occurrence heuristic for lineage, not a citation relation.
pub fn influence_edges(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<GraphEdge> {
    let mut concepts_of: HashMap<&str, HashSet<&str>> = HashMap::new();
    for edge in edges.iter().filter(|e| e.kind == EdgeKind::Concept) {
        concepts_of
            .entry(edge.target.as_str())
            .or_default()
            .insert(edge.source.as_str());
    }

    let dated: Vec<(&GraphNode, i32, &HashSet<&str>)> = nodes
        .iter()
        .filter(|n| n.node_type == NodeType::Work)
        .filter_map(|n| {
            let year = n.year?;
            let concepts = concepts_of.get(n.id.as_str())?;
            Some((n, year, concepts))
        })
        .collect();

    let mut derived = Vec::new();
    for &(earlier, earlier_year, earlier_concepts) in &dated {
        for &(later, later_year, later_concepts) in &dated {
            if earlier.id == later.id || earlier_year >= later_year {
                continue;
            }
            if !earlier_concepts.is_disjoint(later_concepts) {
                derived.push(GraphEdge::new(
                    earlier.id.clone(),
                    later.id.clone(),
                    EdgeKind::Influences,
                ));
            }
        }
    }
    derived
}
