use crate::error::{Error, Result};
use narwhal_graph::{EdgeId, LGraph, NodeMap};

/// Edges whose source lies to the right of their target in the caller's input coordinates.
pub(super) fn contradicting_edges(graph: &LGraph) -> Result<Vec<EdgeId>> {
    let mut center = NodeMap::new(graph, 0.0);
    for id in graph.node_ids() {
        let node = graph.node(id);
        let Some(pos) = node.input_position else {
            return Err(Error::unsupported(format!(
                "interactive cycle breaking needs an input position on node {id} ({})",
                node.name
            )));
        };
        center[id] = pos.x + node.size.width / 2.0;
    }

    Ok(graph
        .edge_ids()
        .filter(|&e| {
            !graph.is_self_loop(e)
                && center[graph.source_node(e)] > center[graph.target_node(e)]
        })
        .collect())
}
