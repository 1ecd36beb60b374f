//! Brandes & Köpf node placement.
//!
//! Four passes (left/right × up/down) each align nodes into blocks along median edges and
//! compact the blocks as close together as the in-layer order allows. The passes are then
//! combined into a balanced layout, or one of them is picked.
//!
//! References:
//! - Ulrik Brandes and Boris Köpf, "Fast and Simple Horizontal Coordinate Assignment".
//! - Ulrik Brandes, Julian Walter and Johannes Zink, "Erratum: Fast and Simple Horizontal
//!   Coordinate Assignment".

mod aligner;
mod compactor;
mod layout;
mod threshold;

pub use layout::BkLayoutKind;

use self::layout::{AlignedLayout, HDirection, VDirection};
use super::Placement;
use crate::config::{BkCompactionStrategy, FixedAlignment, LayeredConfig, Spacings};
use crate::error::Result;
use narwhal_compaction::CGraphDump;
use narwhal_graph::{EdgeId, EdgeMap, LGraph, NodeId, NodeKind, NodeMap};
use serde::Serialize;

/// Class graph handed to the compaction engine by one pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassGraphDump {
    pub layout: BkLayoutKind,
    pub graph: CGraphDump,
}

/// In-layer neighbourhood of every layered node.
pub(crate) struct Neighborhood {
    pub layers: Vec<Vec<NodeId>>,
    pub layer_of: NodeMap<usize>,
    pub index: NodeMap<usize>,
    /// Predecessors in the previous layer, sorted by their index.
    pub left: NodeMap<Vec<(NodeId, EdgeId)>>,
    /// Successors in the next layer, sorted by their index.
    pub right: NodeMap<Vec<(NodeId, EdgeId)>>,
}

impl Neighborhood {
    pub fn build(graph: &LGraph) -> Self {
        let layers: Vec<Vec<NodeId>> = graph.layers().iter().map(|l| l.nodes().to_vec()).collect();
        let mut layer_of = NodeMap::new(graph, usize::MAX);
        let mut index = NodeMap::new(graph, 0usize);
        for (li, nodes) in layers.iter().enumerate() {
            for (i, &v) in nodes.iter().enumerate() {
                layer_of[v] = li;
                index[v] = i;
            }
        }

        let mut left = NodeMap::new(graph, Vec::new());
        let mut right = NodeMap::new(graph, Vec::new());
        for &v in layers.iter().flatten() {
            let mut l: Vec<(NodeId, EdgeId)> = graph
                .incoming_edges(v)
                .into_iter()
                .filter(|&e| !graph.is_self_loop(e))
                .map(|e| (graph.source_node(e), e))
                .filter(|&(u, _)| layer_of[u] != usize::MAX && layer_of[u] + 1 == layer_of[v])
                .collect();
            l.sort_by_key(|&(u, _)| index[u]);
            left[v] = l;

            let mut r: Vec<(NodeId, EdgeId)> = graph
                .outgoing_edges(v)
                .into_iter()
                .filter(|&e| !graph.is_self_loop(e))
                .map(|e| (graph.target_node(e), e))
                .filter(|&(w, _)| layer_of[w] == layer_of[v] + 1)
                .collect();
            r.sort_by_key(|&(w, _)| index[w]);
            right[v] = r;
        }

        Self {
            layers,
            layer_of,
            index,
            left,
            right,
        }
    }

    /// Node directly above `v` in its layer.
    pub fn above(&self, v: NodeId) -> Option<NodeId> {
        let i = self.index[v].checked_sub(1)?;
        Some(self.layers[self.layer_of[v]][i])
    }

    /// Node directly below `v` in its layer.
    pub fn below(&self, v: NodeId) -> Option<NodeId> {
        self.layers[self.layer_of[v]].get(self.index[v] + 1).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.layers.iter().flatten().copied()
    }
}

/// Shared read-only state of all passes.
pub(crate) struct BkContext<'a> {
    pub graph: &'a LGraph,
    pub nb: Neighborhood,
    pub spacing: &'a Spacings,
}

impl BkContext<'_> {
    pub fn spacing_between(&self, a: NodeId, b: NodeId) -> f64 {
        super::vertical_spacing(self.spacing, self.graph.node(a), self.graph.node(b))
    }
}

pub(crate) fn place(graph: &mut LGraph, config: &LayeredConfig) -> Result<Placement> {
    let ctx = BkContext {
        graph: &*graph,
        nb: Neighborhood::build(graph),
        spacing: &config.spacing,
    };
    let marked = mark_conflicts(&ctx);

    let passes: Vec<BkLayoutKind> = match config.bk_fixed_alignment {
        FixedAlignment::None | FixedAlignment::Balanced => BkLayoutKind::PASSES.to_vec(),
        FixedAlignment::LeftUp => vec![BkLayoutKind::LeftUp],
        FixedAlignment::RightUp => vec![BkLayoutKind::RightUp],
        FixedAlignment::LeftDown => vec![BkLayoutKind::LeftDown],
        FixedAlignment::RightDown => vec![BkLayoutKind::RightDown],
    };
    let produce_balanced = matches!(
        config.bk_fixed_alignment,
        FixedAlignment::None | FixedAlignment::Balanced
    );

    let mut layouts = Vec::with_capacity(passes.len());
    let mut class_graphs = Vec::new();
    for kind in passes {
        let Some((hdir, vdir)) = kind.directions() else {
            continue;
        };
        let mut layout = AlignedLayout::pass(ctx.graph, kind, hdir, vdir);
        aligner::vertical_alignment(&ctx, &mut layout, &marked);
        aligner::inside_block_shift(&ctx, &mut layout);
        let class_graph = compactor::horizontal_compaction(
            &ctx,
            &mut layout,
            config.bk_compaction == BkCompactionStrategy::ImproveStraightness,
        )?;
        if config.diagnostics {
            class_graphs.push(ClassGraphDump {
                layout: kind,
                graph: class_graph,
            });
        }
        layouts.push(layout);
    }

    let mut chosen: Option<AlignedLayout> = None;
    if produce_balanced && layouts.len() == BkLayoutKind::PASSES.len() {
        let balanced = balanced_layout(&ctx, &layouts);
        if check_order_constraint(&ctx, &balanced) {
            chosen = Some(balanced);
        }
    }
    let chosen = match chosen {
        Some(layout) => layout,
        None => {
            let mut best: Option<(usize, f64)> = None;
            for (i, layout) in layouts.iter().enumerate() {
                if !check_order_constraint(&ctx, layout) {
                    continue;
                }
                let size = layout.layout_size(&ctx);
                if best.is_none_or(|(_, s)| s > size) {
                    best = Some((i, size));
                }
            }
            let pick = best.map_or(0, |(i, _)| i);
            if layouts.is_empty() {
                return Ok(Placement::default());
            }
            layouts.swap_remove(pick)
        }
    };

    let kind = chosen.kind;
    let positions: Vec<(NodeId, f64)> = ctx
        .nb
        .nodes()
        .map(|v| (v, chosen.y[v].unwrap_or(0.0) + chosen.inner_shift[v]))
        .collect();
    drop(ctx);
    for (v, y) in positions {
        graph.node_mut(v).position.y = y;
    }
    tracing::debug!(layout = ?kind, "brandes-koepf layout chosen");

    Ok(Placement {
        chosen: Some(kind),
        class_graphs,
    })
}

fn is_long_edge(graph: &LGraph, v: NodeId) -> bool {
    matches!(graph.node(v).kind, NodeKind::LongEdge { .. })
}

/// A node is incident to an inner segment if both it and a predecessor are long-edge dummies.
fn incident_to_inner_segment(ctx: &BkContext<'_>, v: NodeId) -> bool {
    is_long_edge(ctx.graph, v)
        && ctx.nb.left[v]
            .iter()
            .any(|&(u, _)| is_long_edge(ctx.graph, u))
}

/// Marks type-1 conflicts: non-inner segments crossing an inner segment.
fn mark_conflicts(ctx: &BkContext<'_>) -> EdgeMap<bool> {
    let mut marked = EdgeMap::new(ctx.graph, false);
    let layers = &ctx.nb.layers;
    if layers.len() < 3 {
        return marked;
    }

    for i in 1..layers.len() - 1 {
        let current = &layers[i + 1];
        let mut k0 = 0usize;
        let mut l = 0usize;
        for (l1, &v) in current.iter().enumerate() {
            let inner = incident_to_inner_segment(ctx, v);
            if l1 + 1 != current.len() && !inner {
                continue;
            }
            let k1 = match ctx.nb.left[v].first() {
                Some(&(u, _)) if inner => ctx.nb.index[u],
                _ => layers[i].len().saturating_sub(1),
            };
            while l <= l1 {
                let vl = current[l];
                if !incident_to_inner_segment(ctx, vl) {
                    for &(u, e) in &ctx.nb.left[vl] {
                        let k = ctx.nb.index[u];
                        if k < k0 || k > k1 {
                            marked[e] = true;
                        }
                    }
                }
                l += 1;
            }
            k0 = k1;
        }
    }
    marked
}

/// Aligns the four passes to the narrowest one and averages the two median positions.
fn balanced_layout(ctx: &BkContext<'_>, layouts: &[AlignedLayout]) -> AlignedLayout {
    let count = layouts.len();
    let mut width = vec![0.0; count];
    let mut min = vec![f64::INFINITY; count];
    let mut max = vec![f64::NEG_INFINITY; count];
    let mut narrowest = 0;
    for (i, layout) in layouts.iter().enumerate() {
        width[i] = layout.layout_size(ctx);
        if width[narrowest] > width[i] {
            narrowest = i;
        }
        for v in ctx.nb.nodes() {
            let y = layout.y[v].unwrap_or(0.0) + layout.inner_shift[v];
            min[i] = min[i].min(y);
            max[i] = max[i].max(y + ctx.graph.node(v).size.height);
        }
    }

    let shift: Vec<f64> = layouts
        .iter()
        .enumerate()
        .map(|(i, layout)| match layout.vdir {
            VDirection::Down => min[narrowest] - min[i],
            VDirection::Up => max[narrowest] - max[i],
        })
        .collect();

    let mut balanced = AlignedLayout::pass(
        ctx.graph,
        BkLayoutKind::Balanced,
        HDirection::Right,
        VDirection::Down,
    );
    let mut ys = vec![0.0; count];
    for v in ctx.nb.nodes() {
        for (i, layout) in layouts.iter().enumerate() {
            ys[i] = layout.y[v].unwrap_or(0.0) + layout.inner_shift[v] + shift[i];
        }
        ys.sort_by(f64::total_cmp);
        balanced.y[v] = Some((ys[1] + ys[2]) / 2.0);
        balanced.inner_shift[v] = 0.0;
    }
    balanced
}

/// Whether every layer keeps its order with no overlapping nodes.
fn check_order_constraint(ctx: &BkContext<'_>, layout: &AlignedLayout) -> bool {
    for layer in &ctx.nb.layers {
        let mut pos = f64::NEG_INFINITY;
        for &v in layer {
            let node = ctx.graph.node(v);
            let y = layout.y[v].unwrap_or(0.0) + layout.inner_shift[v];
            let top = y - node.margin.top;
            let bottom = y + node.size.height + node.margin.bottom;
            if top > pos && bottom > pos {
                pos = bottom;
            } else {
                tracing::trace!(layout = ?layout.kind, node = %v, "layout violates layer order");
                return false;
            }
        }
    }
    true
}
