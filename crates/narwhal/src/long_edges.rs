//! Long-edge dummies.
//!
//! After layering, an edge spanning `k > 1` layers becomes a chain through `k - 1` zero-size
//! [`NodeKind::LongEdge`] dummies, one per intermediate layer. The original edge stays the first
//! segment. [`join`] collapses the chains once routing has produced bend points.

use crate::error::{Error, Result};
use narwhal_graph::{EdgeId, LGraph, NodeKind, Point, PortSide};

/// Splits every edge that spans more than one layer. Returns the number of dummies created.
pub fn split(graph: &mut LGraph) -> Result<usize> {
    let edges: Vec<EdgeId> = graph.edge_ids().collect();
    let mut dummies = 0;
    for e in edges {
        if graph.is_self_loop(e) {
            continue;
        }
        let (source, target) = (graph.source_node(e), graph.target_node(e));
        let (Some(from), Some(to)) = (graph.layer_index(source), graph.layer_index(target)) else {
            return Err(Error::PreconditionViolation {
                element: e.to_string(),
                reason: "edge endpoint has no layer".to_string(),
            });
        };
        if to <= from {
            return Err(Error::PreconditionViolation {
                element: e.to_string(),
                reason: format!("edge runs from layer {from} to layer {to}"),
            });
        }

        let final_target = graph.edge(e).target();
        let (weight, priority) = {
            let edge = graph.edge(e);
            (edge.weight, edge.priority)
        };
        let mut segment = e;
        for layer in from + 1..to {
            let dummy = graph.add_dummy(NodeKind::LongEdge { origin: e });
            let layer_id = graph.layer_ids().nth(layer).ok_or_else(|| {
                Error::PreconditionViolation {
                    element: e.to_string(),
                    reason: format!("layer {layer} does not exist"),
                }
            })?;
            graph.assign_layer(dummy, layer_id);
            let input = graph.add_fixed_port(dummy, PortSide::West, Point::default());
            let output = graph.add_fixed_port(dummy, PortSide::East, Point::default());
            graph.set_target(segment, input);

            let next = graph.add_edge(output, final_target);
            let edge = graph.edge_mut(next);
            edge.weight = weight;
            edge.priority = priority;
            segment = next;
            dummies += 1;
        }
    }
    tracing::debug!(dummies, "long edges split");
    Ok(dummies)
}

/// Merges every dummy chain back into its first segment, concatenating bend and junction points
/// with the dummy positions in between.
pub fn join(graph: &mut LGraph) {
    let dummies: Vec<_> = graph
        .layers()
        .iter()
        .flat_map(|l| l.nodes().iter().copied())
        .filter(|&n| matches!(graph.node(n).kind, NodeKind::LongEdge { .. }))
        .collect();

    for dummy in dummies {
        let incoming = graph.incoming_edges(dummy);
        let outgoing = graph.outgoing_edges(dummy);
        let (&[inc], &[out]) = (incoming.as_slice(), outgoing.as_slice()) else {
            tracing::warn!(node = %dummy, "long-edge dummy without a single in and out edge");
            continue;
        };

        let through = graph.port_absolute_anchor(graph.edge(inc).target());
        let (target, bends, junctions) = {
            let edge = graph.edge(out);
            (
                edge.target(),
                edge.bend_points.clone(),
                edge.junction_points.clone(),
            )
        };
        graph.remove_edge(out);
        graph.set_target(inc, target);
        let edge = graph.edge_mut(inc);
        edge.bend_points.push(through);
        edge.bend_points.extend(bends);
        edge.junction_points.extend(junctions);
        graph.remove_node(dummy);
    }
}
