//! Call Graph and Package Dependency Graph construction (section 4.2, 4.3).

pub mod call_graph;
pub mod package_graph;
pub mod sink;

pub use call_graph::{CallEdge, CallGraph, CallGraphBuilder, CallType, DEFAULT_MAX_DEPTH};
pub use package_graph::{PackageEdgeKinds, PackageGraph, PackageGraphBuilder};
pub use sink::matches_sink_type;
