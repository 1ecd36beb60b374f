//! Eades-style greedy feedback arc set.
//!
//! Sinks are ranked from the right, sources from the left, and when neither exists the node
//! with the largest outflow is ranked next from the left. Edges running from a higher to a lower
//! rank form the feedback set.

use narwhal_graph::{EdgeId, LGraph, NodeId, NodeMap};
use std::collections::VecDeque;

fn edge_weight(graph: &LGraph, e: EdgeId) -> i64 {
    let priority = graph.edge(e).priority;
    if priority > 0 { i64::from(priority) + 1 } else { 1 }
}

struct Work<'g> {
    graph: &'g LGraph,
    indeg: NodeMap<i64>,
    outdeg: NodeMap<i64>,
    mark: NodeMap<i64>,
    sources: VecDeque<NodeId>,
    sinks: VecDeque<NodeId>,
}

impl Work<'_> {
    fn update_neighbors(&mut self, node: NodeId) {
        for e in self.graph.connected_edges(node) {
            if self.graph.is_self_loop(e) {
                continue;
            }
            let other = self.graph.opposite(e, node);
            if self.mark[other] != 0 {
                continue;
            }
            let w = edge_weight(self.graph, e);
            if self.graph.source_node(e) == node {
                self.indeg[other] -= w;
                if self.indeg[other] <= 0 && self.outdeg[other] > 0 {
                    self.sources.push_back(other);
                }
            } else {
                self.outdeg[other] -= w;
                if self.outdeg[other] <= 0 && self.indeg[other] > 0 {
                    self.sinks.push_back(other);
                }
            }
        }
    }
}

pub fn greedy_fas(graph: &LGraph) -> Vec<EdgeId> {
    let nodes: Vec<NodeId> = graph.node_ids().collect();
    if nodes.len() <= 1 {
        return Vec::new();
    }

    let mut work = Work {
        graph,
        indeg: NodeMap::new(graph, 0),
        outdeg: NodeMap::new(graph, 0),
        mark: NodeMap::new(graph, 0),
        sources: VecDeque::new(),
        sinks: VecDeque::new(),
    };

    for e in graph.edge_ids() {
        if graph.is_self_loop(e) {
            continue;
        }
        let w = edge_weight(graph, e);
        work.outdeg[graph.source_node(e)] += w;
        work.indeg[graph.target_node(e)] += w;
    }
    for &n in &nodes {
        if work.outdeg[n] == 0 {
            work.sinks.push_back(n);
        } else if work.indeg[n] == 0 {
            work.sources.push_back(n);
        }
    }

    let mut next_right: i64 = -1;
    let mut next_left: i64 = 1;
    let mut unprocessed = nodes.len();

    while unprocessed > 0 {
        while let Some(sink) = work.sinks.pop_front() {
            if work.mark[sink] != 0 {
                continue;
            }
            work.mark[sink] = next_right;
            next_right -= 1;
            work.update_neighbors(sink);
            unprocessed -= 1;
        }
        while let Some(source) = work.sources.pop_front() {
            if work.mark[source] != 0 {
                continue;
            }
            work.mark[source] = next_left;
            next_left += 1;
            work.update_neighbors(source);
            unprocessed -= 1;
        }
        if unprocessed == 0 {
            break;
        }

        // Lowest id wins among equal outflows.
        let mut best: Option<(i64, NodeId)> = None;
        for &n in &nodes {
            if work.mark[n] != 0 {
                continue;
            }
            let outflow = work.outdeg[n] - work.indeg[n];
            if best.is_none_or(|(max, _)| outflow > max) {
                best = Some((outflow, n));
            }
        }
        let Some((_, picked)) = best else {
            break;
        };
        work.mark[picked] = next_left;
        next_left += 1;
        work.update_neighbors(picked);
        unprocessed -= 1;
    }

    // Sinks were numbered from -1 downwards; move them behind every left rank.
    let shift = nodes.len() as i64 + 1;
    for &n in &nodes {
        if work.mark[n] < 0 {
            work.mark[n] += shift;
        }
    }

    graph
        .edge_ids()
        .filter(|&e| {
            !graph.is_self_loop(e)
                && work.mark[graph.source_node(e)] > work.mark[graph.target_node(e)]
        })
        .collect()
}
