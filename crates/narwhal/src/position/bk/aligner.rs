//! Block building: vertical alignment along median edges and the inner shifts that make
//! aligned ports line up.

use super::BkContext;
use super::layout::{AlignedLayout, HDirection, VDirection};
use narwhal_graph::{EdgeId, EdgeMap, NodeId};

/// Aligns each node with one of its median neighbours in the preceding layer (in pass
/// direction), skipping marked edges and alignments that would cross an earlier one.
pub(super) fn vertical_alignment(
    ctx: &BkContext<'_>,
    layout: &mut AlignedLayout,
    marked: &EdgeMap<bool>,
) {
    let mut layers: Vec<&Vec<NodeId>> = ctx.nb.layers.iter().collect();
    if layout.hdir == HDirection::Left {
        layers.reverse();
    }

    for layer in layers {
        let mut nodes: Vec<NodeId> = layer.clone();
        if layout.vdir == VDirection::Up {
            nodes.reverse();
        }
        let mut r: i64 = match layout.vdir {
            VDirection::Up => i64::MAX,
            VDirection::Down => -1,
        };

        for v in nodes {
            let neighbors = match layout.hdir {
                HDirection::Left => &ctx.nb.right[v],
                HDirection::Right => &ctx.nb.left[v],
            };
            let d = neighbors.len();
            if d == 0 {
                continue;
            }
            let low = (d + 1) / 2 - 1;
            let high = (d + 2) / 2 - 1;
            let medians: Vec<usize> = match layout.vdir {
                VDirection::Up => (low..=high).rev().collect(),
                VDirection::Down => (low..=high).collect(),
            };

            for m in medians {
                if layout.align[v] != v {
                    break;
                }
                let (u, e) = neighbors[m];
                let u_index = ctx.nb.index[u] as i64;
                let in_order = match layout.vdir {
                    VDirection::Down => r < u_index,
                    VDirection::Up => r > u_index,
                };
                if !marked[e] && in_order {
                    layout.align[u] = v;
                    layout.root[v] = layout.root[u];
                    layout.align[v] = layout.root[v];
                    r = u_index;
                }
            }
        }
    }
}

/// Computes, per block, the offset of every member relative to the block's top and the
/// block's total extent including margins.
pub(super) fn inside_block_shift(ctx: &BkContext<'_>, layout: &mut AlignedLayout) {
    let roots: Vec<NodeId> = ctx.nb.nodes().filter(|&v| layout.root[v] == v).collect();
    for root in roots {
        let root_node = ctx.graph.node(root);
        let mut space_above = root_node.margin.top;
        let mut space_below = root_node.size.height + root_node.margin.bottom;
        layout.inner_shift[root] = 0.0;

        let mut current = root;
        let mut next = layout.align[root];
        while next != root {
            let diff = match edge_between(ctx, current, next) {
                Some(e) => port_offset(ctx, e, current) - port_offset(ctx, e, next),
                None => 0.0,
            };
            layout.inner_shift[next] = layout.inner_shift[current] + diff;

            let node = ctx.graph.node(next);
            space_above = space_above.max(node.margin.top - layout.inner_shift[next]);
            space_below = space_below
                .max(layout.inner_shift[next] + node.size.height + node.margin.bottom);
            current = next;
            next = layout.align[next];
        }

        for member in layout.block(root) {
            layout.inner_shift[member] += space_above;
        }
        layout.block_size[root] = space_above + space_below;
    }
}

fn edge_between(ctx: &BkContext<'_>, a: NodeId, b: NodeId) -> Option<EdgeId> {
    ctx.nb.left[a]
        .iter()
        .chain(&ctx.nb.right[a])
        .find(|&&(n, _)| n == b)
        .map(|&(_, e)| e)
}

/// Port anchor y of edge `e` relative to the top of `node`.
fn port_offset(ctx: &BkContext<'_>, e: EdgeId, node: NodeId) -> f64 {
    let edge = ctx.graph.edge(e);
    let port = if ctx.graph.port(edge.source()).node == node {
        ctx.graph.port(edge.source())
    } else {
        ctx.graph.port(edge.target())
    };
    port.position.y + port.anchor.y
}
