//! Hypernodes of one layer gap and the "routes left of" dependencies between them.
//!
//! A hypernode is a set of ports connected through edges of the gap; all its edges share one
//! vertical segment. Its span is the y range of those ports.

use narwhal_compaction::Scanline;
use narwhal_graph::{LGraph, NodeId, PortId};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Spans shorter than this are straight and need no slot.
pub const TOLERANCE: f64 = 1e-3;
const CONFLICT_PENALTY: u32 = 16;

#[derive(Debug, Clone)]
pub struct HyperNode {
    pub ports: Vec<PortId>,
    /// Members that belong to nodes of the left layer.
    pub sources: Vec<PortId>,
    pub start: f64,
    pub end: f64,
    /// Sorted, deduplicated y positions of ports in the left layer.
    pub source_positions: Vec<f64>,
    /// Sorted, deduplicated y positions of ports in the right layer.
    pub target_positions: Vec<f64>,
    pub slot: usize,
}

impl HyperNode {
    fn new() -> Self {
        Self {
            ports: Vec::new(),
            sources: Vec::new(),
            start: f64::INFINITY,
            end: f64::NEG_INFINITY,
            source_positions: Vec::new(),
            target_positions: Vec::new(),
            slot: 0,
        }
    }

    pub fn is_straight(&self) -> bool {
        (self.end - self.start).abs() < TOLERANCE
    }
}

/// `source` must take a smaller slot than `target`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Dependency {
    pub source: usize,
    pub target: usize,
    pub weight: u32,
    #[serde(skip)]
    pub(crate) active: bool,
}

fn insert_sorted(list: &mut Vec<f64>, value: f64) {
    match list.binary_search_by(|p| p.total_cmp(&value)) {
        Ok(_) => {}
        Err(at) => list.insert(at, value),
    }
}

/// Groups the ports of the edges between `left` and `right` into hypernodes, seeded in
/// node and port order of the left layer.
pub fn build(graph: &LGraph, left: &[NodeId], right: &[NodeId]) -> Vec<HyperNode> {
    let in_left: FxHashSet<NodeId> = left.iter().copied().collect();
    let in_right: FxHashSet<NodeId> = right.iter().copied().collect();
    let crosses_gap =
        |e| in_left.contains(&graph.source_node(e)) && in_right.contains(&graph.target_node(e));

    let mut owner: FxHashMap<PortId, usize> = FxHashMap::default();
    let mut hypernodes: Vec<HyperNode> = Vec::new();
    for &node in left {
        for &seed in graph.node(node).ports() {
            if owner.contains_key(&seed)
                || !graph.port(seed).outgoing().iter().any(|&e| crosses_gap(e))
            {
                continue;
            }

            let id = hypernodes.len();
            let mut hn = HyperNode::new();
            let mut stack = vec![seed];
            owner.insert(seed, id);
            while let Some(p) = stack.pop() {
                let port = graph.port(p);
                let y = graph.port_absolute_anchor(p).y;
                hn.ports.push(p);
                hn.start = hn.start.min(y);
                hn.end = hn.end.max(y);
                if in_left.contains(&port.node) {
                    hn.sources.push(p);
                    insert_sorted(&mut hn.source_positions, y);
                } else {
                    insert_sorted(&mut hn.target_positions, y);
                }

                for &e in port.outgoing().iter().chain(port.incoming()) {
                    if !crosses_gap(e) {
                        continue;
                    }
                    let edge = graph.edge(e);
                    let other = if edge.source() == p {
                        edge.target()
                    } else {
                        edge.source()
                    };
                    if !owner.contains_key(&other) {
                        owner.insert(other, id);
                        stack.push(other);
                    }
                }
            }
            hypernodes.push(hn);
        }
    }
    hypernodes
}

/// Pairs of positions closer than `threshold`, walking both sorted lists once.
fn count_conflicts(a: &[f64], b: &[f64], threshold: f64) -> u32 {
    let (mut i, mut j) = (0, 0);
    let mut conflicts = 0;
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    loop {
        let (p, q) = (a[i], b[j]);
        if p > q - threshold && p < q + threshold {
            conflicts += 1;
        }
        if p <= q && i + 1 < a.len() {
            i += 1;
        } else if q <= p && j + 1 < b.len() {
            j += 1;
        } else {
            break;
        }
    }
    conflicts
}

fn count_crossings(positions: &[f64], start: f64, end: f64) -> u32 {
    positions
        .iter()
        .take_while(|&&p| p <= end)
        .filter(|&&p| p >= start)
        .count() as u32
}

/// Weight of routing `a` left of `b`: horizontal segments of `a` running right cross `b`'s
/// vertical segment, those of `b` coming from the left cross `a`'s.
fn order_weight(a: &HyperNode, b: &HyperNode, threshold: f64) -> u32 {
    let conflicts = count_conflicts(&a.target_positions, &b.source_positions, threshold);
    let crossings = count_crossings(&a.target_positions, b.start, b.end)
        + count_crossings(&b.source_positions, a.start, a.end);
    CONFLICT_PENALTY * conflicts + crossings
}

/// Dependencies between every pair of non-straight hypernodes, in creation order.
pub fn dependencies(hypernodes: &[HyperNode], threshold: f64) -> Vec<Dependency> {
    let mut deps = Vec::new();
    let mut add = |source, target, weight| {
        deps.push(Dependency {
            source,
            target,
            weight,
            active: true,
        });
    };
    for i in 0..hypernodes.len() {
        for j in i + 1..hypernodes.len() {
            let (a, b) = (&hypernodes[i], &hypernodes[j]);
            if a.is_straight() || b.is_straight() {
                continue;
            }
            let a_first = order_weight(a, b, threshold);
            let b_first = order_weight(b, a, threshold);
            if a_first < b_first {
                add(i, j, b_first - a_first);
            } else if a_first > b_first {
                add(j, i, a_first - b_first);
            } else if a_first > 0 {
                add(i, j, 0);
                add(j, i, 0);
            }
        }
    }
    deps
}

fn adjacency(count: usize, deps: &[Dependency]) -> Vec<Vec<usize>> {
    let mut out = vec![Vec::new(); count];
    for (d, dep) in deps.iter().enumerate() {
        out[dep.source].push(d);
    }
    out
}

/// A cycle of active dependencies, found by iterative depth-first search in hypernode order.
fn find_cycle(count: usize, deps: &[Dependency], out: &[Vec<usize>]) -> Option<Vec<usize>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        White,
        Gray,
        Black,
    }
    let mut color = vec![Color::White; count];
    let mut via: Vec<Option<usize>> = vec![None; count];

    for start in 0..count {
        if color[start] != Color::White {
            continue;
        }
        color[start] = Color::Gray;
        let mut stack = vec![(start, 0usize)];
        while let Some((v, next)) = stack.last_mut() {
            let v = *v;
            let Some(&d) = out[v].get(*next) else {
                color[v] = Color::Black;
                stack.pop();
                continue;
            };
            *next += 1;
            if !deps[d].active {
                continue;
            }
            let w = deps[d].target;
            match color[w] {
                Color::White => {
                    color[w] = Color::Gray;
                    via[w] = Some(d);
                    stack.push((w, 0));
                }
                Color::Gray => {
                    let mut cycle = vec![d];
                    let mut x = v;
                    while x != w {
                        let Some(pd) = via[x] else { break };
                        cycle.push(pd);
                        x = deps[pd].source;
                    }
                    return Some(cycle);
                }
                Color::Black => {}
            }
        }
    }
    None
}

/// Deactivates dependencies until the graph is acyclic, always the lightest one on the found
/// cycle. Returns how many removed dependencies carried weight, i.e. became visible crossings.
pub fn break_cycles(count: usize, deps: &mut [Dependency]) -> usize {
    let out = adjacency(count, deps);
    let mut crossings = 0;
    while let Some(cycle) = find_cycle(count, deps, &out) {
        let Some(&lightest) = cycle.iter().min_by_key(|&&d| (deps[d].weight, d)) else {
            break;
        };
        deps[lightest].active = false;
        if deps[lightest].weight > 0 {
            crossings += 1;
        }
    }
    crossings
}

/// Gives every non-straight hypernode the smallest slot above all its predecessors whose
/// occupants do not overlap its span widened by `threshold`. Returns the number of slots.
pub fn assign_slots(hypernodes: &mut [HyperNode], deps: &[Dependency], threshold: f64) -> usize {
    let count = hypernodes.len();
    let mut indegree = vec![0usize; count];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); count];
    let out = adjacency(count, deps);
    for (d, dep) in deps.iter().enumerate() {
        if dep.active {
            indegree[dep.target] += 1;
            incoming[dep.target].push(d);
        }
    }

    let mut rank = vec![0usize; count];
    let mut heap: BinaryHeap<Reverse<usize>> =
        (0..count).filter(|&h| indegree[h] == 0).map(Reverse).collect();
    let mut next = 0;
    while let Some(Reverse(h)) = heap.pop() {
        rank[h] = next;
        next += 1;
        for &d in &out[h] {
            if !deps[d].active {
                continue;
            }
            let t = deps[d].target;
            indegree[t] -= 1;
            if indegree[t] == 0 {
                heap.push(Reverse(t));
            }
        }
    }

    let spans: Vec<(f64, f64)> = hypernodes
        .iter()
        .map(|h| (h.start - threshold, h.end + threshold))
        .collect();
    let mut slot_of: Vec<usize> = vec![0; count];
    let mut occupied: Vec<Vec<(f64, f64)>> = Vec::new();
    let mut assign = |&h: &usize| {
        let lowest = incoming[h]
            .iter()
            .map(|&d| slot_of[deps[d].source] + 1)
            .max()
            .unwrap_or(0);
        let (lo, hi) = spans[h];
        let mut slot = lowest;
        while occupied
            .get(slot)
            .is_some_and(|taken| taken.iter().any(|&(a, b)| lo < b && a < hi))
        {
            slot += 1;
        }
        if occupied.len() <= slot {
            occupied.resize(slot + 1, Vec::new());
        }
        occupied[slot].push((lo, hi));
        slot_of[h] = slot;
    };

    let points: Vec<usize> = (0..count).filter(|&h| !hypernodes[h].is_straight()).collect();
    Scanline::new(points)
        .handler(&mut assign)
        .execute(|a, b| rank[*a].cmp(&rank[*b]));

    for (h, hn) in hypernodes.iter_mut().enumerate() {
        hn.slot = slot_of[h];
    }
    occupied.len()
}
