//! Cartograph Compiler
//!
//! Turns a cartography spec (concepts, scholars, year window, mode) into a
//! graph of concepts, works and authors:
//! - Spec validation and normalization
//! - Concurrent fetch, enrichment and name resolution with per-call timeouts
//! - Work identity and graph assembly
//! - Mode passes (co-authorship, lineage)
//!
//! Identical inputs from the sources always produce an identical graph.

pub mod builder;
pub mod codes;
pub mod identity;
pub mod mock;
pub mod passes;
pub mod pipeline;
pub mod spec;

pub use builder::GraphBuilder;
pub use pipeline::{build_graph, Compiler, DEFAULT_CALL_TIMEOUT};
pub use spec::ValidatedSpec;
