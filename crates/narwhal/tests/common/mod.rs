//! Graph generators shared by the integration tests.

#![allow(dead_code)]

use narwhal::graph::{LGraph, NodeId, Size};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;
use std::ops::RangeInclusive;

/// A directed multigraph by node index. Cycles, parallel edges and self-loops are all allowed.
#[derive(Debug, Clone)]
pub struct GraphShape {
    pub sizes: Vec<(f64, f64)>,
    pub edges: Vec<(usize, usize)>,
}

impl GraphShape {
    pub fn build(&self) -> (LGraph, Vec<NodeId>) {
        let mut g = LGraph::new();
        let ids: Vec<NodeId> = self
            .sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| g.add_node(format!("n{i}"), Size::new(w, h)))
            .collect();
        for &(s, t) in &self.edges {
            g.connect(ids[s], ids[t]);
        }
        (g, ids)
    }
}

fn arb_size() -> impl Strategy<Value = (f64, f64)> {
    (20u32..40, 10u32..40).prop_map(|(w, h)| (f64::from(w), f64::from(h)))
}

/// Random graphs with up to `edges_per_node` edges per node.
pub fn arb_graph(
    nodes: RangeInclusive<usize>,
    edges_per_node: usize,
) -> impl Strategy<Value = GraphShape> {
    nodes.prop_flat_map(move |n| {
        (
            prop::collection::vec(arb_size(), n),
            prop::collection::vec((0..n, 0..n), 0..=edges_per_node * n),
        )
            .prop_map(|(sizes, edges)| GraphShape { sizes, edges })
    })
}

/// A path `n0 -> n1 -> ...` through all nodes plus `random_edges` arbitrary edges.
pub fn arb_connected_graph(nodes: usize, random_edges: usize) -> impl Strategy<Value = GraphShape> {
    (
        prop::collection::vec(arb_size(), nodes),
        prop::collection::vec((0..nodes, 0..nodes), random_edges),
    )
        .prop_map(move |(sizes, random)| {
            let mut edges: Vec<(usize, usize)> = (1..nodes).map(|v| (v - 1, v)).collect();
            edges.extend(random);
            GraphShape { sizes, edges }
        })
}

/// One value of `strategy`, the same on every run.
pub fn sample<S: Strategy>(strategy: S) -> S::Value {
    let mut runner = TestRunner::deterministic();
    strategy
        .new_tree(&mut runner)
        .expect("strategy yields a value")
        .current()
}

/// Kahn's algorithm over the active non-loop edges.
pub fn is_acyclic(g: &LGraph) -> bool {
    let mut indeg = vec![0usize; g.node_capacity()];
    for e in g.edge_ids().filter(|&e| !g.is_self_loop(e)) {
        indeg[g.target_node(e).index()] += 1;
    }
    let mut ready: Vec<NodeId> = g.node_ids().filter(|n| indeg[n.index()] == 0).collect();
    let mut seen = 0;
    while let Some(n) = ready.pop() {
        seen += 1;
        for e in g.outgoing_edges(n) {
            if g.is_self_loop(e) {
                continue;
            }
            let t = g.target_node(e);
            indeg[t.index()] -= 1;
            if indeg[t.index()] == 0 {
                ready.push(t);
            }
        }
    }
    seen == g.node_count()
}
