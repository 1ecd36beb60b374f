//! Layer sweep: reorder one layer by the positions of its neighbours in a fixed layer.

use crate::config::CrossingMinimizationHeuristic;
use narwhal_graph::{LGraph, LayerId, NodeId, NodeMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    /// Fixed layer is the previous one; neighbours are predecessors.
    Forward,
    /// Fixed layer is the next one; neighbours are successors.
    Backward,
}

/// Sort key of every node in `free`. Nodes without neighbours in the fixed layer keep their
/// current index.
pub fn sort_keys(
    graph: &LGraph,
    free: LayerId,
    fixed_index: &NodeMap<usize>,
    direction: SweepDirection,
    heuristic: CrossingMinimizationHeuristic,
) -> Vec<(NodeId, f64)> {
    let fixed_layer = match direction {
        SweepDirection::Forward => free.index().checked_sub(1),
        SweepDirection::Backward => Some(free.index() + 1),
    };

    graph
        .layer(free)
        .nodes()
        .iter()
        .enumerate()
        .map(|(current, &v)| {
            let neighbours = match direction {
                SweepDirection::Forward => graph.incoming_edges(v),
                SweepDirection::Backward => graph.outgoing_edges(v),
            };
            let mut positions: Vec<f64> = neighbours
                .into_iter()
                .map(|e| graph.opposite(e, v))
                .filter(|&w| fixed_layer.is_some() && graph.layer_index(w) == fixed_layer)
                .map(|w| fixed_index[w] as f64)
                .collect();
            let key = match heuristic {
                _ if positions.is_empty() => current as f64,
                CrossingMinimizationHeuristic::Barycenter => {
                    positions.iter().sum::<f64>() / positions.len() as f64
                }
                CrossingMinimizationHeuristic::Median => {
                    positions.sort_by(f64::total_cmp);
                    median(&positions)
                }
            };
            (v, key)
        })
        .collect()
}

fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Reorders `free` by its sort keys. The sort is stable, so ties keep their current order.
pub fn reorder_layer(
    graph: &mut LGraph,
    free: LayerId,
    fixed_index: &NodeMap<usize>,
    direction: SweepDirection,
    heuristic: CrossingMinimizationHeuristic,
) {
    let mut keyed = sort_keys(graph, free, fixed_index, direction, heuristic);
    keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
    graph.set_layer_order(free, keyed.into_iter().map(|(v, _)| v).collect());
}
