//! Network simplex layering (Gansner et al.).
//!
//! Each weakly connected component is solved on its own copy of the working graph. Large
//! components first lose their degree-one leaves, which are re-attached with tight edges after
//! the simplex. Pivots update cut values along the tree path of the entering edge only, and
//! recompute low/lim inside the subtree of that path's topmost node.

mod tree;

use crate::config::NetworkSimplexConfig;
use crate::error::{Error, Result};
use crate::rank::ngraph::NGraph;
use std::collections::VecDeque;

/// Components with at least this many nodes get their leaves peeled before pivoting.
const LEAF_REMOVAL_THRESHOLD: usize = 40;

const CUT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimplexStats {
    pub components: usize,
    pub pivots: u64,
    /// Set when some component stopped at the iteration limit.
    pub limit_reached: bool,
}

/// Assigns an optimal layer to every node of `graph`.
///
/// Fails with a precondition violation when the graph has a directed cycle.
pub fn solve(graph: &mut NGraph, config: &NetworkSimplexConfig) -> Result<SimplexStats> {
    init_layering(graph)?;

    let mut stats = SimplexStats::default();
    for component in graph.components() {
        stats.components += 1;
        if component.len() == 1 {
            graph.nodes[component[0]].layer = 0;
            continue;
        }
        let (mut sub, edge_map) = graph.extract(&component);
        solve_connected(&mut sub, config, &mut stats);
        graph.write_back(&component, &sub, &edge_map);
    }

    if config.balance {
        balance(graph);
    }
    tracing::debug!(
        components = stats.components,
        pivots = stats.pivots,
        "network simplex finished"
    );
    Ok(stats)
}

/// Longest path from the sources; fails on cycles.
fn init_layering(g: &mut NGraph) -> Result<()> {
    let n = g.nodes.len();
    let mut pending: Vec<usize> = g.nodes.iter().map(|v| v.incoming.len()).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| pending[v] == 0).collect();
    for v in &mut g.nodes {
        v.layer = 0;
    }
    let mut visited = 0;
    while let Some(v) = queue.pop_front() {
        visited += 1;
        for ix in 0..g.nodes[v].outgoing.len() {
            let e = g.nodes[v].outgoing[ix];
            let (t, delta) = (g.edges[e].target, g.edges[e].delta);
            let candidate = g.nodes[v].layer + delta;
            if candidate > g.nodes[t].layer {
                g.nodes[t].layer = candidate;
            }
            pending[t] -= 1;
            if pending[t] == 0 {
                queue.push_back(t);
            }
        }
    }
    if visited < n {
        let on_cycle = (0..n).find(|&v| pending[v] > 0).unwrap_or(0);
        return Err(Error::PreconditionViolation {
            element: g.element_name(on_cycle),
            reason: "layering input contains a cycle".to_string(),
        });
    }
    Ok(())
}

fn solve_connected(g: &mut NGraph, config: &NetworkSimplexConfig, stats: &mut SimplexStats) {
    if g.nodes.len() >= LEAF_REMOVAL_THRESHOLD {
        let (peeled, core) = peel_leaves(g);
        if !peeled.is_empty() {
            let (mut inner, edge_map) = g.extract(&core);
            run(&mut inner, config, stats);
            g.write_back(&core, &inner, &edge_map);
            for &(leaf, e) in peeled.iter().rev() {
                let edge = &g.edges[e];
                let layer = if edge.source == leaf {
                    g.nodes[edge.target].layer - edge.delta
                } else {
                    g.nodes[edge.source].layer + edge.delta
                };
                g.nodes[leaf].layer = layer;
                g.nodes[leaf].parent = Some(e);
                let weight = g.edges[e].weight;
                g.edges[e].tree = true;
                g.edges[e].cut_value = weight;
            }
            normalize(g);
            return;
        }
    }
    run(g, config, stats);
    normalize(g);
}

/// Repeatedly removes nodes with a single incident edge. Returns the removed `(leaf, edge)`
/// pairs in removal order and the remaining nodes.
fn peel_leaves(g: &NGraph) -> (Vec<(usize, usize)>, Vec<usize>) {
    let n = g.nodes.len();
    let mut degree: Vec<usize> = g.nodes.iter().map(|v| v.degree()).collect();
    let mut removed = vec![false; n];
    let mut edge_removed = vec![false; g.edges.len()];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| degree[v] == 1).collect();
    let mut peeled = Vec::new();

    while let Some(v) = queue.pop_front() {
        if removed[v] || degree[v] != 1 {
            continue;
        }
        let Some(e) = g.nodes[v].incident().find(|&e| !edge_removed[e]) else {
            continue;
        };
        let w = g.edges[e].other(v);
        removed[v] = true;
        edge_removed[e] = true;
        degree[v] = 0;
        degree[w] -= 1;
        peeled.push((v, e));
        if degree[w] == 1 {
            queue.push_back(w);
        }
    }

    let core = (0..n).filter(|&v| !removed[v]).collect();
    (peeled, core)
}

fn run(g: &mut NGraph, config: &NetworkSimplexConfig, stats: &mut SimplexStats) {
    if g.nodes.len() <= 1 {
        return;
    }
    tree::feasible_tree(g);
    for v in &mut g.nodes {
        v.parent = None;
    }
    tree::assign_low_lim(g, 0, 1);
    tree::init_cut_values(g);

    let mut iterations: u32 = 0;
    while let Some(leave) = leave_edge(g) {
        if iterations >= config.iteration_limit {
            stats.limit_reached = true;
            tracing::warn!(
                limit = config.iteration_limit,
                nodes = g.nodes.len(),
                "network simplex hit its iteration limit; keeping the current feasible layering"
            );
            break;
        }
        let Some(enter) = enter_edge(g, leave) else {
            break;
        };
        exchange(g, leave, enter);
        iterations += 1;
    }
    stats.pivots += u64::from(iterations);
}

/// Tree edge with the most negative cut value, lowest index first on ties.
fn leave_edge(g: &NGraph) -> Option<usize> {
    let mut best: Option<(f64, usize)> = None;
    for (ix, e) in g.edges.iter().enumerate() {
        if !e.tree || e.cut_value >= -CUT_EPSILON {
            continue;
        }
        if best.is_none_or(|(cut, _)| e.cut_value < cut) {
            best = Some((e.cut_value, ix));
        }
    }
    best.map(|(_, ix)| ix)
}

/// Non-tree edge with minimum slack going from the head component of `leave` to its tail
/// component.
fn enter_edge(g: &NGraph, leave: usize) -> Option<usize> {
    let (s, t) = (g.edges[leave].source, g.edges[leave].target);
    // The endpoint further from the root roots the cut-off subtree.
    let (subtree_root, flip) = if g.nodes[s].lim > g.nodes[t].lim {
        (t, true)
    } else {
        (s, false)
    };

    let mut best: Option<(i32, usize)> = None;
    for (ix, e) in g.edges.iter().enumerate() {
        if e.tree {
            continue;
        }
        let source_below = tree::is_descendant(g, e.source, subtree_root);
        let target_below = tree::is_descendant(g, e.target, subtree_root);
        if source_below != flip || target_below == flip {
            continue;
        }
        let slack = g.slack(ix);
        if best.is_none_or(|(s, _)| slack < s) {
            best = Some((slack, ix));
        }
    }
    best.map(|(_, ix)| ix)
}

fn exchange(g: &mut NGraph, leave: usize, enter: usize) {
    let (u, v) = (g.edges[enter].source, g.edges[enter].target);

    // Tree path between the entering edge's endpoints, through their lowest common ancestor.
    let mut path = Vec::new();
    let mut lca = u;
    while !tree::is_descendant(g, v, lca) {
        let Some(e) = g.nodes[lca].parent else {
            break;
        };
        path.push(e);
        lca = g.edges[e].other(lca);
    }
    let mut x = v;
    while x != lca {
        let Some(e) = g.nodes[x].parent else {
            break;
        };
        path.push(e);
        x = g.edges[e].other(x);
    }

    let cut = g.edges[leave].cut_value;
    for &t in &path {
        if t == leave {
            continue;
        }
        let edge = &g.edges[t];
        let child = if g.nodes[edge.source].parent == Some(t) {
            edge.source
        } else {
            edge.target
        };
        let tail_is_below = edge.source == child;
        let source_in_tail = tree::is_descendant(g, u, child) == tail_is_below;
        let sign = if source_in_tail { 1.0 } else { -1.0 };
        g.edges[t].cut_value += sign * cut;
    }

    // Shift the subtree cut off by `leave` so that `enter` becomes tight.
    let slack = g.slack(enter);
    let below = {
        let edge = &g.edges[leave];
        if g.nodes[edge.source].parent == Some(leave) {
            edge.source
        } else {
            edge.target
        }
    };
    let shift = if tree::is_descendant(g, u, below) {
        slack
    } else {
        -slack
    };
    if shift != 0 {
        let (low, lim) = (g.nodes[below].low, g.nodes[below].lim);
        for node in &mut g.nodes {
            if low <= node.lim && node.lim <= lim {
                node.layer += shift;
            }
        }
    }

    g.edges[leave].tree = false;
    g.edges[leave].cut_value = 0.0;
    g.edges[enter].tree = true;
    g.edges[enter].cut_value = -cut;

    let first_lim = g.nodes[lca].low;
    tree::assign_low_lim(g, lca, first_lim);
}

fn normalize(g: &mut NGraph) {
    let Some(min) = g.nodes.iter().map(|v| v.layer).min() else {
        return;
    };
    for v in &mut g.nodes {
        v.layer -= min;
    }
}

/// Moves nodes whose weighted in- and out-degree agree to the least filled layer of their
/// feasible range. The total weighted span does not change.
fn balance(g: &mut NGraph) {
    let Some(max) = g.nodes.iter().map(|v| v.layer).max() else {
        return;
    };
    let mut filling = vec![0usize; (max + 1).max(0) as usize];
    for v in &g.nodes {
        filling[v.layer as usize] += 1;
    }

    for v in 0..g.nodes.len() {
        let node = &g.nodes[v];
        let in_weight: f64 = node.incoming.iter().map(|&e| g.edges[e].weight).sum();
        let out_weight: f64 = node.outgoing.iter().map(|&e| g.edges[e].weight).sum();
        if node.incoming.is_empty() || node.outgoing.is_empty() || in_weight != out_weight {
            continue;
        }
        let low = node
            .incoming
            .iter()
            .map(|&e| g.nodes[g.edges[e].source].layer + g.edges[e].delta)
            .max()
            .unwrap_or(node.layer);
        let high = node
            .outgoing
            .iter()
            .map(|&e| g.nodes[g.edges[e].target].layer - g.edges[e].delta)
            .min()
            .unwrap_or(node.layer);

        let current = node.layer;
        let mut best = current;
        for layer in low..=high {
            if filling[layer as usize] < filling[best as usize] {
                best = layer;
            }
        }
        if best != current {
            filling[current as usize] -= 1;
            filling[best as usize] += 1;
            g.nodes[v].layer = best;
        }
    }
}
