//! Dependency graph construction
//!
//! - [`key`]: package identities, dependency descriptors, the depth bound
//! - [`source`]: where dependency lists come from (registry or table)
//! - [`accumulator`]: the graph, cycle report, and warnings a traversal produces
//! - [`engine`]: the depth-bounded walk with path-based cycle detection

pub mod accumulator;
pub mod engine;
pub mod key;
pub mod source;

pub use accumulator::{Cycle, CycleReport, DependencyGraph, GraphNode, SourceWarning};
pub use engine::{
    Completion, Traversal, TraversalEngine, TraversalError, TraversalOptions, build_graph,
};
pub use key::{DependencyDescriptor, DependencyEdge, MaxDepth, PackageKey};
pub use source::{ConfiguredSource, DependencySource, RegistrySource, SourceError, StaticSource};
