//! Node placement along the in-layer axis.
//!
//! Layers run along x; this phase only decides y. The default strategy is Brandes-Köpf
//! ([`bk`]); [`simple`] stacks each layer from the top and exists as a baseline.

pub mod bk;
mod simple;

pub use bk::{BkLayoutKind, ClassGraphDump};

use crate::config::{LayeredConfig, NodePlacementStrategy, Spacings};
use crate::error::Result;
use narwhal_graph::{LGraph, Node};

/// What the placement phase decided.
#[derive(Debug, Clone, Default)]
pub struct Placement {
    /// Layout picked by Brandes-Köpf, `None` for the simple strategy.
    pub chosen: Option<BkLayoutKind>,
    /// Class graphs of every computed pass, kept when diagnostics are on.
    pub class_graphs: Vec<ClassGraphDump>,
}

/// Assigns every layered node a y coordinate, then translates the drawing so the topmost
/// node (margin included) starts at 0.
pub fn place_nodes(graph: &mut LGraph, config: &LayeredConfig) -> Result<Placement> {
    let _span = tracing::debug_span!("place_nodes", strategy = ?config.node_placement).entered();

    let placement = match config.node_placement {
        NodePlacementStrategy::BrandesKoepf => bk::place(graph, config)?,
        NodePlacementStrategy::Simple => {
            simple::place(graph, &config.spacing);
            Placement::default()
        }
    };
    normalize(graph);
    Ok(placement)
}

/// Minimum distance between two vertically adjacent nodes of one layer.
pub(crate) fn vertical_spacing(spacing: &Spacings, a: &Node, b: &Node) -> f64 {
    match (a.is_dummy(), b.is_dummy()) {
        (false, false) => spacing.node_node,
        (true, true) => spacing.edge_edge,
        _ => spacing.edge_node,
    }
}

fn normalize(graph: &mut LGraph) {
    let nodes: Vec<_> = graph
        .layers()
        .iter()
        .flat_map(|l| l.nodes().iter().copied())
        .collect();
    let top = nodes
        .iter()
        .map(|&n| {
            let node = graph.node(n);
            node.position.y - node.margin.top
        })
        .fold(f64::INFINITY, f64::min);
    if !top.is_finite() {
        return;
    }
    for n in nodes {
        graph.node_mut(n).position.y -= top;
    }
}
