//! Thresholds that pull a block towards a straight edge while it is being placed.
//!
//! The classic strategy never constrains anything. The straightening strategy looks at the
//! first and last member of a block: if one of their edges leads to an already placed block,
//! the block may not move past the position that makes that edge straight. Edges whose other
//! end is not placed yet are revisited once all blocks are placed.

use super::BkContext;
use super::layout::{AlignedLayout, HDirection, VDirection};
use narwhal_graph::{EdgeId, NodeId, NodeMap, PortId};
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
pub(super) struct Postprocessable {
    free: NodeId,
    is_root: bool,
    edge: Option<EdgeId>,
    has_edges: bool,
}

pub(super) enum ThresholdStrategy {
    Null,
    Straighten {
        block_finished: NodeMap<bool>,
        queue: VecDeque<Postprocessable>,
    },
}

impl ThresholdStrategy {
    pub fn new(ctx: &BkContext<'_>, straighten: bool) -> Self {
        if straighten {
            ThresholdStrategy::Straighten {
                block_finished: NodeMap::new(ctx.graph, false),
                queue: VecDeque::new(),
            }
        } else {
            ThresholdStrategy::Null
        }
    }

    /// The threshold that never restricts a block in this pass.
    pub fn invalid(layout: &AlignedLayout) -> f64 {
        match layout.vdir {
            VDirection::Up => f64::INFINITY,
            VDirection::Down => f64::NEG_INFINITY,
        }
    }

    pub fn calculate(
        &mut self,
        ctx: &BkContext<'_>,
        layout: &mut AlignedLayout,
        old: f64,
        root: NodeId,
        current: NodeId,
    ) -> f64 {
        let ThresholdStrategy::Straighten {
            block_finished,
            queue,
        } = self
        else {
            return old;
        };

        let is_root = root == current;
        let is_last = layout.align[current] == root;
        if !(is_root || is_last) {
            return old;
        }

        let mut t = Self::invalid(layout);
        if is_root {
            t = bound(ctx, layout, block_finished, queue, root, true);
        }
        if !t.is_finite() && is_last {
            t = bound(ctx, layout, block_finished, queue, current, false);
        }
        t
    }

    pub fn finish_block(&mut self, root: NodeId) {
        if let ThresholdStrategy::Straighten { block_finished, .. } = self {
            block_finished[root] = true;
        }
    }

    /// Revisits queued block ends now that every block has a position.
    pub fn post_process(&mut self, ctx: &BkContext<'_>, layout: &mut AlignedLayout) {
        let ThresholdStrategy::Straighten {
            block_finished,
            queue,
        } = self
        else {
            return;
        };

        let mut stack: Vec<Postprocessable> = Vec::new();
        while let Some(pp) = queue.pop_front() {
            let pick = pick_edge(ctx, layout, block_finished, pp);
            if pick.edge.is_none() {
                continue;
            }
            if !process(ctx, layout, pick) {
                stack.push(pick);
            }
        }
        while let Some(pp) = stack.pop() {
            process(ctx, layout, pp);
        }
    }
}

/// Edges of a block end that face the neighbouring layer outside the block.
fn candidate_edges(
    ctx: &BkContext<'_>,
    layout: &AlignedLayout,
    pp: Postprocessable,
) -> Vec<EdgeId> {
    let incoming = if pp.is_root {
        layout.hdir == HDirection::Right
    } else {
        layout.hdir == HDirection::Left
    };
    let neighbors = if incoming {
        &ctx.nb.left[pp.free]
    } else {
        &ctx.nb.right[pp.free]
    };
    neighbors.iter().map(|&(_, e)| e).collect()
}

fn pick_edge(
    ctx: &BkContext<'_>,
    layout: &AlignedLayout,
    block_finished: &NodeMap<bool>,
    mut pp: Postprocessable,
) -> Postprocessable {
    let mut has_edges = false;
    for e in candidate_edges(ctx, layout, pp) {
        if layout.su[layout.root[pp.free]] {
            continue;
        }
        has_edges = true;
        let other = ctx.graph.opposite(e, pp.free);
        if block_finished[layout.root[other]] {
            pp.has_edges = true;
            pp.edge = Some(e);
            return pp;
        }
    }
    pp.has_edges = has_edges;
    pp.edge = None;
    pp
}

/// Ports of `e` as `(on the free node, on the other node)`.
fn ports(ctx: &BkContext<'_>, e: EdgeId, free: NodeId) -> (PortId, PortId) {
    let edge = ctx.graph.edge(e);
    if ctx.graph.port(edge.source()).node == free {
        (edge.source(), edge.target())
    } else {
        (edge.target(), edge.source())
    }
}

fn bound(
    ctx: &BkContext<'_>,
    layout: &mut AlignedLayout,
    block_finished: &NodeMap<bool>,
    queue: &mut VecDeque<Postprocessable>,
    free: NodeId,
    is_root: bool,
) -> f64 {
    let invalid = ThresholdStrategy::invalid(layout);
    let pick = pick_edge(
        ctx,
        layout,
        block_finished,
        Postprocessable {
            free,
            is_root,
            edge: None,
            has_edges: false,
        },
    );
    let Some(e) = pick.edge else {
        if pick.has_edges {
            queue.push_back(pick);
        }
        return invalid;
    };

    let (block_port, other_port) = ports(ctx, e, free);
    let block = ctx.graph.port(block_port);
    let other = ctx.graph.port(other_port);
    let other_root = layout.root[other.node];
    let threshold = layout.y[other_root].unwrap_or(0.0)
        + layout.inner_shift[other.node]
        + other.position.y
        + other.anchor.y
        - layout.inner_shift[block.node]
        - block.position.y
        - block.anchor.y;

    let (source, target) = (ctx.graph.source_node(e), ctx.graph.target_node(e));
    let (sr, tr) = (layout.root[source], layout.root[target]);
    layout.su[sr] = true;
    layout.su[tr] = true;
    threshold
}

/// Moves a block towards the position that makes its picked edge straight, as far as its
/// layer neighbours allow. Returns whether it moved.
fn process(ctx: &BkContext<'_>, layout: &mut AlignedLayout, pp: Postprocessable) -> bool {
    let Some(e) = pp.edge else {
        return false;
    };
    let (block, fix) = ports(ctx, e, pp.free);
    let delta = layout.calculate_delta(ctx.graph, fix, block);
    if delta > 0.0 {
        let available = layout.check_space_above(ctx, pp.free, delta);
        layout.shift_block(pp.free, -available);
        available > 0.0
    } else if delta < 0.0 {
        let available = layout.check_space_below(ctx, pp.free, -delta);
        layout.shift_block(pp.free, available);
        available > 0.0
    } else {
        false
    }
}
