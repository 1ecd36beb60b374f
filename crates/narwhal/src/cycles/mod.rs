//! Cycle breaking.
//!
//! Every strategy computes a feedback arc set and reverses it through
//! [`LGraph::reverse_edge`], so reversed edges keep their identity and are turned back by the
//! reversed-edge restorer once routing is done. Self-loops are never part of the set.

mod depth_first;
mod greedy;
mod interactive;

pub use depth_first::depth_first_fas;
pub use greedy::greedy_fas;

use crate::config::{CycleBreakingStrategy, LayeredConfig};
use crate::error::Result;
use narwhal_graph::{EdgeId, LGraph};

/// Makes the graph acyclic. Returns the number of reversed edges.
pub fn break_cycles(graph: &mut LGraph, config: &LayeredConfig) -> Result<usize> {
    let _span = tracing::debug_span!("break_cycles", strategy = ?config.cycle_breaking).entered();

    let fas = match config.cycle_breaking {
        CycleBreakingStrategy::DepthFirst => depth_first_fas(graph),
        CycleBreakingStrategy::Greedy => greedy_fas(graph),
        CycleBreakingStrategy::Interactive => {
            let reversed = interactive::contradicting_edges(graph)?;
            reverse_all(graph, &reversed);
            // Nodes sharing an x coordinate may still form cycles.
            let rest = depth_first_fas(graph);
            reverse_all(graph, &rest);
            let count = reversed.len() + rest.len();
            tracing::debug!(reversed = count, "cycles broken");
            return Ok(count);
        }
    };

    reverse_all(graph, &fas);
    tracing::debug!(reversed = fas.len(), "cycles broken");
    Ok(fas.len())
}

fn reverse_all(graph: &mut LGraph, edges: &[EdgeId]) {
    for &e in edges {
        if !graph.is_self_loop(e) {
            graph.reverse_edge(e, true);
        }
    }
}
