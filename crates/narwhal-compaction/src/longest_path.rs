//! Longest-path relaxation over the constraint DAG (compaction to the left).

use crate::cgraph::{CNode, CNodeId};
use crate::error::{Error, Result};
use std::collections::VecDeque;

/// Outgoing `(target, gap)` lists, indexed by node.
pub type Adjacency = Vec<Vec<(usize, f64)>>;

/// Moves every unlocked node to its minimal feasible `hitbox.x`.
///
/// Nodes without incoming constraints start at the smallest `x` of all nodes. Locked nodes keep
/// their `x`, but still push their successors.
pub fn compact(nodes: &mut [CNode], adjacency: &Adjacency, locked: &[bool]) -> Result<()> {
    let n = nodes.len();
    if n == 0 {
        return Ok(());
    }

    let min_start = nodes
        .iter()
        .map(|c| c.hitbox.x)
        .fold(f64::INFINITY, f64::min);

    let mut indeg: Vec<usize> = vec![0; n];
    for outs in adjacency {
        for &(t, _) in outs {
            indeg[t] += 1;
        }
    }

    let mut start: Vec<f64> = vec![f64::NEG_INFINITY; n];
    let mut queue: VecDeque<usize> = (0..n).filter(|&v| indeg[v] == 0).collect();
    for &v in &queue {
        start[v] = min_start;
    }

    let mut processed = 0usize;
    while let Some(v) = queue.pop_front() {
        processed += 1;
        if locked[v] {
            start[v] = nodes[v].hitbox.x;
        }
        let end = start[v] + nodes[v].hitbox.width;
        for &(t, gap) in &adjacency[v] {
            start[t] = start[t].max(end + gap);
            indeg[t] -= 1;
            if indeg[t] == 0 {
                queue.push_back(t);
            }
        }
    }

    if processed < n {
        let culprit = node_on_cycle(adjacency, &indeg);
        return Err(Error::PreconditionViolation {
            element: format!("{} ({})", CNodeId::from_index(culprit), nodes[culprit].name),
            reason: "constraint graph contains a cycle".to_string(),
        });
    }

    for (v, node) in nodes.iter_mut().enumerate() {
        if !locked[v] {
            node.hitbox.x = start[v];
        }
    }
    Ok(())
}

/// Walks backwards through unprocessed nodes until one repeats; that node lies on a cycle.
fn node_on_cycle(adjacency: &Adjacency, indeg: &[usize]) -> usize {
    let n = indeg.len();
    let mut pred: Vec<Option<usize>> = vec![None; n];
    for (v, outs) in adjacency.iter().enumerate() {
        if indeg[v] == 0 {
            continue;
        }
        for &(t, _) in outs {
            pred[t].get_or_insert(v);
        }
    }
    let Some(mut cur) = (0..n).find(|&v| indeg[v] > 0) else {
        return 0;
    };
    let mut seen = vec![false; n];
    while !seen[cur] {
        seen[cur] = true;
        match pred[cur] {
            Some(p) => cur = p,
            None => break,
        }
    }
    cur
}
