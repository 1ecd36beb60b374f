//! Crossing minimization.
//!
//! Layer sweeps alternate between top-down (forward) and bottom-up (backward) passes. Each pass
//! reorders a layer by the barycenter or median of its neighbours in the layer fixed just
//! before it. The ordering with the fewest crossings seen so far is kept.

mod barycenter;
mod cross_count;
mod ports;

pub use barycenter::{SweepDirection, reorder_layer, sort_keys};
pub use cross_count::cross_count;
pub use ports::distribute_ports;

use crate::config::LayeredConfig;
use crate::error::Result;
use narwhal_graph::{LGraph, LayerId, NodeId, NodeMap};

/// Sweeps without improvement before giving up early.
const STALE_SWEEPS: u32 = 2;

/// Reorders layers to reduce crossings and distributes free ports. Returns the crossing count
/// of the chosen ordering.
pub fn minimize_crossings(graph: &mut LGraph, config: &LayeredConfig) -> Result<usize> {
    let _span = tracing::debug_span!(
        "minimize_crossings",
        heuristic = ?config.crossing_minimization,
        layers = graph.layer_count()
    )
    .entered();

    let mut best = snapshot(graph);
    let mut best_crossings = cross_count(graph);
    let initial = best_crossings;
    let mut stale = 0;
    let mut sweeps = 0;

    while sweeps < config.sweep_iterations && best_crossings > 0 && graph.layer_count() > 1 {
        let direction = if sweeps % 2 == 0 {
            SweepDirection::Forward
        } else {
            SweepDirection::Backward
        };
        sweep(graph, direction, config);
        sweeps += 1;

        let crossings = cross_count(graph);
        if crossings < best_crossings {
            best_crossings = crossings;
            best = snapshot(graph);
            stale = 0;
        } else {
            stale += 1;
            if stale >= STALE_SWEEPS {
                break;
            }
        }
    }
    restore(graph, best);
    distribute_ports(graph);

    tracing::debug!(initial, crossings = best_crossings, sweeps, "layers ordered");
    Ok(best_crossings)
}

fn sweep(graph: &mut LGraph, direction: SweepDirection, config: &LayeredConfig) {
    let mut index = NodeMap::new(graph, 0usize);
    for layer in graph.layers() {
        for (i, &n) in layer.nodes().iter().enumerate() {
            index[n] = i;
        }
    }

    let layers: Vec<LayerId> = match direction {
        SweepDirection::Forward => graph.layer_ids().skip(1).collect(),
        SweepDirection::Backward => {
            let count = graph.layer_count();
            let mut layers: Vec<LayerId> =
                graph.layer_ids().take(count.saturating_sub(1)).collect();
            layers.reverse();
            layers
        }
    };
    for layer in layers {
        reorder_layer(graph, layer, &index, direction, config.crossing_minimization);
        for (i, &n) in graph.layer(layer).nodes().iter().enumerate() {
            index[n] = i;
        }
    }
}

fn snapshot(graph: &LGraph) -> Vec<Vec<NodeId>> {
    graph.layers().iter().map(|l| l.nodes().to_vec()).collect()
}

fn restore(graph: &mut LGraph, order: Vec<Vec<NodeId>>) {
    for (layer, nodes) in graph.layer_ids().collect::<Vec<_>>().into_iter().zip(order) {
        graph.set_layer_order(layer, nodes);
    }
}
