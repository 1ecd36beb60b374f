#![forbid(unsafe_code)]

//! Layered graph layout.
//!
//! [`layout`] runs the phases in order on an [`LGraph`](narwhal_graph::LGraph): cycle breaking,
//! network simplex layering, long edge splitting, layer sweep crossing minimization,
//! Brandes-Köpf node placement and orthogonal edge routing. Self-loops are kept out of the
//! pipeline and routed around their node. Every phase is also public on its own.
//!
//! Layers run left to right along x; the order inside a layer runs top to bottom along y.

pub use narwhal_compaction as compaction;
pub use narwhal_graph as graph;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod cycles;
pub mod diagnostics;
pub mod error;
pub mod long_edges;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod progress;
pub mod rank;
pub mod routing;
pub mod self_loops;

pub use config::{
    BkCompactionStrategy, CrossingMinimizationHeuristic, CycleBreakingStrategy, FixedAlignment,
    LayeredConfig, NetworkSimplexConfig, NodePlacementStrategy, Spacings,
};
pub use diagnostics::Diagnostics;
pub use error::{Error, Result};
pub use pipeline::{LayoutReport, layout};
pub use position::BkLayoutKind;
pub use progress::{
    CancellableMonitor, NullMonitor, ProgressEvent, ProgressMonitor, RecordingMonitor,
    TracingMonitor,
};
