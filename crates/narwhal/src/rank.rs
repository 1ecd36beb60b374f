//! Layer assignment.
//!
//! The graph is copied into an [`NGraph`], solved by [`network_simplex::solve`] and written back
//! as fresh [`Layer`](narwhal_graph::Layer)s.

pub mod network_simplex;
pub mod ngraph;

pub use network_simplex::SimplexStats;
pub use ngraph::{NGraph, NGraphDump};

use crate::config::LayeredConfig;
use crate::error::Result;
use narwhal_graph::LGraph;

#[derive(Debug, Clone)]
pub struct Layering {
    pub layer_count: usize,
    pub stats: SimplexStats,
    /// Working graph snapshot, kept when diagnostics are enabled.
    pub dump: Option<NGraphDump>,
}

/// Assigns every live node to a layer. The graph must be acyclic apart from self-loops.
pub fn assign_layers(graph: &mut LGraph, config: &LayeredConfig) -> Result<Layering> {
    let _span = tracing::debug_span!("assign_layers", nodes = graph.node_count()).entered();

    let mut ng = NGraph::from_lgraph(graph)?;
    let stats = network_simplex::solve(&mut ng, &config.network_simplex)?;
    ng.apply_layers(graph);

    let layer_count = graph.layer_count();
    tracing::debug!(layers = layer_count, pivots = stats.pivots, "layers assigned");
    Ok(Layering {
        layer_count,
        stats,
        dump: config.diagnostics.then(|| ng.dump()),
    })
}
