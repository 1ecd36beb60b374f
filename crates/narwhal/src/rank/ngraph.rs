//! Working graph for network simplex.
//!
//! Nodes and edges live in flat vectors and refer to each other by index. The tree bookkeeping
//! (`parent`, `low`, `lim`, `tree`, `cut_value`) is only meaningful while the simplex runs and
//! right after it, when it is kept for [`NGraph::dump`].

use crate::error::{Error, Result};
use narwhal_graph::{EdgeId, LGraph, NodeId, NodeMap};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct NNode {
    pub origin: Option<NodeId>,
    pub layer: i32,
    pub(crate) low: u32,
    pub(crate) lim: u32,
    /// Tree edge towards the root.
    pub(crate) parent: Option<usize>,
    pub(crate) incoming: Vec<usize>,
    pub(crate) outgoing: Vec<usize>,
}

impl NNode {
    pub(crate) fn incident(&self) -> impl Iterator<Item = usize> + '_ {
        self.incoming.iter().chain(self.outgoing.iter()).copied()
    }

    pub(crate) fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

#[derive(Debug, Clone)]
pub struct NEdge {
    pub origin: Option<EdgeId>,
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub delta: i32,
    pub cut_value: f64,
    pub tree: bool,
}

impl NEdge {
    pub(crate) fn other(&self, node: usize) -> usize {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NGraph {
    pub(crate) nodes: Vec<NNode>,
    pub(crate) edges: Vec<NEdge>,
}

impl NGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, origin: Option<NodeId>) -> usize {
        self.nodes.push(NNode {
            origin,
            ..Default::default()
        });
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, source: usize, target: usize, weight: f64, delta: i32) -> usize {
        self.push_edge(source, target, weight, delta, None)
    }

    fn push_edge(
        &mut self,
        source: usize,
        target: usize,
        weight: f64,
        delta: i32,
        origin: Option<EdgeId>,
    ) -> usize {
        let ix = self.edges.len();
        self.edges.push(NEdge {
            origin,
            source,
            target,
            weight,
            delta,
            cut_value: 0.0,
            tree: false,
        });
        self.nodes[source].outgoing.push(ix);
        self.nodes[target].incoming.push(ix);
        ix
    }

    /// One node per live node and one edge per active, non-loop edge, both in insertion order.
    pub fn from_lgraph(graph: &LGraph) -> Result<Self> {
        let mut ng = NGraph::new();
        let mut index = NodeMap::new(graph, usize::MAX);
        for id in graph.node_ids() {
            index[id] = ng.add_node(Some(id));
        }
        for e in graph.edge_ids() {
            if graph.is_self_loop(e) {
                continue;
            }
            let edge = graph.edge(e);
            if !edge.weight.is_finite() || edge.weight < 0.0 {
                return Err(Error::PreconditionViolation {
                    element: e.to_string(),
                    reason: format!(
                        "edge weight must be finite and non-negative, got {}",
                        edge.weight
                    ),
                });
            }
            let delta = match i32::try_from(edge.delta) {
                Ok(delta) if delta >= 1 => delta,
                _ => {
                    return Err(Error::PreconditionViolation {
                        element: e.to_string(),
                        reason: format!("edge delta must be at least 1, got {}", edge.delta),
                    });
                }
            };
            let (s, t) = (index[graph.source_node(e)], index[graph.target_node(e)]);
            ng.push_edge(s, t, edge.weight, delta, Some(e));
        }
        Ok(ng)
    }

    /// Rebuilds the layers of `graph` from the computed layer values. Nodes keep their insertion
    /// order inside each layer.
    pub fn apply_layers(&self, graph: &mut LGraph) {
        graph.clear_layers();
        let count = self
            .nodes
            .iter()
            .map(|n| n.layer + 1)
            .max()
            .unwrap_or(0)
            .max(0);
        let layers: Vec<_> = (0..count).map(|_| graph.add_layer()).collect();
        for n in &self.nodes {
            if let Some(origin) = n.origin {
                graph.assign_layer(origin, layers[n.layer.max(0) as usize]);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn layer(&self, node: usize) -> i32 {
        self.nodes[node].layer
    }

    pub fn edge(&self, edge: usize) -> &NEdge {
        &self.edges[edge]
    }

    pub(crate) fn slack(&self, edge: usize) -> i32 {
        let e = &self.edges[edge];
        self.nodes[e.target].layer - self.nodes[e.source].layer - e.delta
    }

    /// `sum(weight * span)` over all edges.
    pub fn weighted_span(&self) -> f64 {
        self.edges
            .iter()
            .map(|e| e.weight * f64::from(self.nodes[e.target].layer - self.nodes[e.source].layer))
            .sum()
    }

    /// Whether every edge spans at least its delta.
    pub fn is_feasible(&self) -> bool {
        (0..self.edges.len()).all(|e| self.slack(e) >= 0)
    }

    pub(crate) fn element_name(&self, node: usize) -> String {
        match self.nodes[node].origin {
            Some(id) => id.to_string(),
            None => format!("#{node}"),
        }
    }

    /// Weakly connected components, each listed in ascending node order.
    pub(crate) fn components(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut out = Vec::new();
        for start in 0..self.nodes.len() {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut comp = vec![start];
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                for e in self.nodes[v].incident() {
                    let w = self.edges[e].other(v);
                    if !seen[w] {
                        seen[w] = true;
                        comp.push(w);
                        stack.push(w);
                    }
                }
            }
            comp.sort_unstable();
            out.push(comp);
        }
        out
    }

    /// Copies the subgraph induced by `nodes`. Returns it together with the original index of
    /// every extracted edge.
    pub(crate) fn extract(&self, nodes: &[usize]) -> (NGraph, Vec<usize>) {
        let mut local = vec![usize::MAX; self.nodes.len()];
        let mut sub = NGraph::new();
        for &n in nodes {
            local[n] = sub.add_node(self.nodes[n].origin);
            sub.nodes[local[n]].layer = self.nodes[n].layer;
        }
        let mut edge_map = Vec::new();
        for &n in nodes {
            for &e in &self.nodes[n].outgoing {
                let edge = &self.edges[e];
                if local[edge.target] == usize::MAX {
                    continue;
                }
                sub.push_edge(
                    local[edge.source],
                    local[edge.target],
                    edge.weight,
                    edge.delta,
                    edge.origin,
                );
                edge_map.push(e);
            }
        }
        (sub, edge_map)
    }

    /// Copies solver state back from a graph produced by [`extract`](Self::extract).
    pub(crate) fn write_back(&mut self, nodes: &[usize], sub: &NGraph, edge_map: &[usize]) {
        for (local, &n) in nodes.iter().enumerate() {
            let src = &sub.nodes[local];
            let dst = &mut self.nodes[n];
            dst.layer = src.layer;
            dst.low = src.low;
            dst.lim = src.lim;
            dst.parent = src.parent.map(|e| edge_map[e]);
        }
        for (local, &e) in edge_map.iter().enumerate() {
            self.edges[e].tree = sub.edges[local].tree;
            self.edges[e].cut_value = sub.edges[local].cut_value;
        }
    }

    pub fn dump(&self) -> NGraphDump {
        NGraphDump {
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(ix, n)| NNodeDump {
                    id: ix,
                    origin: n.origin.map(|o| o.to_string()),
                    layer: n.layer,
                    low: n.low,
                    lim: n.lim,
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|e| NEdgeDump {
                    origin: e.origin.map(|o| o.to_string()),
                    source: e.source,
                    target: e.target,
                    weight: e.weight,
                    delta: e.delta,
                    cut_value: e.cut_value,
                    tree: e.tree,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NNodeDump {
    pub id: usize,
    pub origin: Option<String>,
    pub layer: i32,
    pub low: u32,
    pub lim: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NEdgeDump {
    pub origin: Option<String>,
    pub source: usize,
    pub target: usize,
    pub weight: f64,
    pub delta: i32,
    pub cut_value: f64,
    pub tree: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NGraphDump {
    pub nodes: Vec<NNodeDump>,
    pub edges: Vec<NEdgeDump>,
}
