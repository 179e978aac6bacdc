//! Data contracts shared by the compiler, the sources and the gateway
//!
//! - `Spec`: the declarative cartography query
//! - `WorkRecord`: one bibliographic record as fetched and enriched
//! - `Graph`: the compiled cartography (nodes, edges, reference index)

mod graph;
mod identifier;
mod spec;
mod work;

pub use graph::{Citation, EdgeKind, Graph, GraphEdge, GraphNode, NodeType, RefIndex};
pub use identifier::is_scholar_identifier;
pub use spec::{Mode, Spec, YearWindow};
pub use work::{normalize_doi, normalize_title, Bibliographic, WorkAuthor, WorkRecord};
