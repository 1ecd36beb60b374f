use narwhal_graph::{EdgeId, LGraph, NodeMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    New,
    OnStack,
    Done,
}

/// Edges that point back into the DFS recursion stack.
///
/// The search starts from every source first, then from any node left unvisited, both in
/// insertion order. Out-edges are explored in port order.
pub fn depth_first_fas(graph: &LGraph) -> Vec<EdgeId> {
    let mut state = NodeMap::new(graph, Visit::New);
    let mut fas = Vec::new();

    let nodes: Vec<_> = graph.node_ids().collect();
    let sources = nodes.iter().copied().filter(|&n| {
        graph
            .incoming_edges(n)
            .iter()
            .all(|&e| graph.is_self_loop(e))
    });
    let starts: Vec<_> = sources.chain(nodes.iter().copied()).collect();

    for start in starts {
        if state[start] != Visit::New {
            continue;
        }
        // Explicit stack of (node, outgoing edges, next edge index).
        let mut stack = vec![(start, graph.outgoing_edges(start), 0usize)];
        state[start] = Visit::OnStack;
        while let Some((node, edges, next)) = stack.last_mut() {
            let Some(&e) = edges.get(*next) else {
                state[*node] = Visit::Done;
                stack.pop();
                continue;
            };
            *next += 1;
            if graph.is_self_loop(e) {
                continue;
            }
            let target = graph.target_node(e);
            match state[target] {
                Visit::OnStack => fas.push(e),
                Visit::Done => {}
                Visit::New => {
                    state[target] = Visit::OnStack;
                    stack.push((target, graph.outgoing_edges(target), 0));
                }
            }
        }
    }
    fas
}
