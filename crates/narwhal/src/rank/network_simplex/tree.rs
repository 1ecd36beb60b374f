//! Spanning-tree bookkeeping: tight tree construction, low/lim numbering and cut values.

use crate::rank::ngraph::NGraph;

/// Grows a tight spanning tree from node 0, shifting the partial tree by the smallest incident
/// slack whenever no tight edge leaves it. Marks the tree edges and returns nothing else; the
/// layering stays feasible throughout.
pub(super) fn feasible_tree(g: &mut NGraph) {
    let n = g.nodes.len();
    for e in &mut g.edges {
        e.tree = false;
        e.cut_value = 0.0;
    }
    if n == 0 {
        return;
    }

    let mut in_tree = vec![false; n];
    let mut members = vec![0usize];
    in_tree[0] = true;
    grow_tight(g, 0, &mut in_tree, &mut members);

    while members.len() < n {
        let mut best: Option<(i32, usize)> = None;
        for (ix, e) in g.edges.iter().enumerate() {
            if in_tree[e.source] == in_tree[e.target] {
                continue;
            }
            let slack = g.slack(ix);
            if best.is_none_or(|(s, _)| slack < s) {
                best = Some((slack, ix));
            }
        }
        // Connected input always has an incident edge.
        let Some((slack, ix)) = best else {
            return;
        };
        let (source, target) = (g.edges[ix].source, g.edges[ix].target);
        let shift = if in_tree[source] { slack } else { -slack };
        for &m in &members {
            g.nodes[m].layer += shift;
        }
        let fresh = if in_tree[source] { target } else { source };
        g.edges[ix].tree = true;
        in_tree[fresh] = true;
        members.push(fresh);
        grow_tight(g, fresh, &mut in_tree, &mut members);
    }
}

fn grow_tight(g: &mut NGraph, start: usize, in_tree: &mut [bool], members: &mut Vec<usize>) {
    let mut stack = vec![start];
    while let Some(v) = stack.pop() {
        let incident: Vec<usize> = g.nodes[v].incident().collect();
        for e in incident {
            let w = g.edges[e].other(v);
            if in_tree[w] || g.slack(e) != 0 {
                continue;
            }
            g.edges[e].tree = true;
            in_tree[w] = true;
            members.push(w);
            stack.push(w);
        }
    }
}

/// Assigns `parent`, `low` and `lim` for the subtree hanging below `root`, numbering it in
/// postorder from `first_lim`. The parent edge of `root` itself is left alone.
pub(super) fn assign_low_lim(g: &mut NGraph, root: usize, first_lim: u32) {
    struct Frame {
        node: usize,
        next: usize,
        low: u32,
    }

    let mut next_lim = first_lim;
    let mut stack = vec![Frame {
        node: root,
        next: 0,
        low: next_lim,
    }];
    while let Some(frame) = stack.last_mut() {
        let v = frame.node;
        let edge = {
            let node = &g.nodes[v];
            let k = frame.next;
            if k < node.incoming.len() {
                Some(node.incoming[k])
            } else {
                node.outgoing.get(k - node.incoming.len()).copied()
            }
        };
        match edge {
            Some(e) => {
                frame.next += 1;
                if !g.edges[e].tree || g.nodes[v].parent == Some(e) {
                    continue;
                }
                let w = g.edges[e].other(v);
                g.nodes[w].parent = Some(e);
                stack.push(Frame {
                    node: w,
                    next: 0,
                    low: next_lim,
                });
            }
            None => {
                let low = frame.low;
                stack.pop();
                g.nodes[v].low = low;
                g.nodes[v].lim = next_lim;
                next_lim += 1;
            }
        }
    }
}

/// Whether `node` lies in the subtree rooted at `root`.
pub(super) fn is_descendant(g: &NGraph, node: usize, root: usize) -> bool {
    let (r, v) = (&g.nodes[root], &g.nodes[node]);
    r.low <= v.lim && v.lim <= r.lim
}

/// Computes every tree edge's cut value bottom-up. Requires a fresh low/lim numbering.
pub(super) fn init_cut_values(g: &mut NGraph) {
    let mut postorder: Vec<usize> = (0..g.nodes.len()).collect();
    postorder.sort_unstable_by_key(|&v| g.nodes[v].lim);
    for v in postorder {
        if let Some(parent_edge) = g.nodes[v].parent {
            g.edges[parent_edge].cut_value = cut_value_below(g, v, parent_edge);
        }
    }
}

/// Cut value of `child`'s parent edge from the cut values of the child's own tree edges.
fn cut_value_below(g: &NGraph, child: usize, parent_edge: usize) -> f64 {
    let child_is_tail = g.edges[parent_edge].source == child;
    let mut cut = g.edges[parent_edge].weight;
    for e in g.nodes[child].incident() {
        if e == parent_edge {
            continue;
        }
        let edge = &g.edges[e];
        let points_to_head = (edge.source == child) == child_is_tail;
        cut += if points_to_head { edge.weight } else { -edge.weight };
        if edge.tree {
            cut += if points_to_head {
                -edge.cut_value
            } else {
                edge.cut_value
            };
        }
    }
    cut
}
