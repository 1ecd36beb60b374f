use super::BkContext;
use narwhal_graph::{LGraph, NodeId, NodeMap, PortId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VDirection {
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HDirection {
    Right,
    Left,
}

/// One of the four directional passes, or their combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BkLayoutKind {
    RightDown,
    RightUp,
    LeftDown,
    LeftUp,
    Balanced,
}

impl BkLayoutKind {
    /// The directional passes, in the order they are computed.
    pub const PASSES: [BkLayoutKind; 4] = [
        BkLayoutKind::RightDown,
        BkLayoutKind::RightUp,
        BkLayoutKind::LeftDown,
        BkLayoutKind::LeftUp,
    ];

    pub(crate) fn directions(self) -> Option<(HDirection, VDirection)> {
        match self {
            BkLayoutKind::RightDown => Some((HDirection::Right, VDirection::Down)),
            BkLayoutKind::RightUp => Some((HDirection::Right, VDirection::Up)),
            BkLayoutKind::LeftDown => Some((HDirection::Left, VDirection::Down)),
            BkLayoutKind::LeftUp => Some((HDirection::Left, VDirection::Up)),
            BkLayoutKind::Balanced => None,
        }
    }
}

/// Per-pass block state. Blocks are cyclic lists through `align`, entered at their `root`.
#[derive(Debug, Clone)]
pub(crate) struct AlignedLayout {
    pub kind: BkLayoutKind,
    pub hdir: HDirection,
    pub vdir: VDirection,
    pub root: NodeMap<NodeId>,
    pub align: NodeMap<NodeId>,
    /// Offset of a node from its block's y, so that aligned ports line up.
    pub inner_shift: NodeMap<f64>,
    /// Extent of a block, indexed by its root.
    pub block_size: NodeMap<f64>,
    pub sink: NodeMap<NodeId>,
    /// Class shift, indexed by sink.
    pub shift: NodeMap<Option<f64>>,
    pub y: NodeMap<Option<f64>>,
    /// Blocks already straightened by the threshold strategy, indexed by root.
    pub su: NodeMap<bool>,
}

impl AlignedLayout {
    pub fn pass(graph: &LGraph, kind: BkLayoutKind, hdir: HDirection, vdir: VDirection) -> Self {
        let mut identity = NodeMap::new(graph, NodeId::from_index(0));
        for v in graph.node_ids() {
            identity[v] = v;
        }
        Self {
            kind,
            hdir,
            vdir,
            root: identity.clone(),
            align: identity.clone(),
            inner_shift: NodeMap::new(graph, 0.0),
            block_size: NodeMap::new(graph, 0.0),
            sink: identity,
            shift: NodeMap::new(graph, None),
            y: NodeMap::new(graph, None),
            su: NodeMap::new(graph, false),
        }
    }

    /// Members of the block rooted at `root`, starting with the root.
    pub fn block(&self, root: NodeId) -> Vec<NodeId> {
        let mut members = vec![root];
        let mut current = self.align[root];
        while current != root {
            members.push(current);
            current = self.align[current];
        }
        members
    }

    fn pos(&self, v: NodeId) -> f64 {
        self.y[self.root[v]].unwrap_or(0.0)
    }

    /// Extent of the pass from the topmost block start to the bottommost block end.
    pub fn layout_size(&self, ctx: &BkContext<'_>) -> f64 {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in ctx.nb.nodes() {
            let y = self.y[v].unwrap_or(0.0);
            min = min.min(y);
            max = max.max(y + self.block_size[self.root[v]]);
        }
        if min.is_finite() { max - min } else { 0.0 }
    }

    fn port_y(&self, graph: &LGraph, port: PortId) -> f64 {
        let p = graph.port(port);
        self.y[p.node].unwrap_or(0.0) + self.inner_shift[p.node] + p.position.y + p.anchor.y
    }

    /// How far `block` sits below `fix`.
    pub fn calculate_delta(&self, graph: &LGraph, fix: PortId, block: PortId) -> f64 {
        self.port_y(graph, block) - self.port_y(graph, fix)
    }

    /// Moves every member of the block containing `v` by `delta`.
    pub fn shift_block(&mut self, v: NodeId, delta: f64) {
        let root = self.root[v];
        for member in self.block(root) {
            if let Some(y) = self.y[member].as_mut() {
                *y += delta;
            }
        }
    }

    fn min_y(&self, ctx: &BkContext<'_>, v: NodeId) -> f64 {
        self.pos(v) + self.inner_shift[v] - ctx.graph.node(v).margin.top
    }

    fn max_y(&self, ctx: &BkContext<'_>, v: NodeId) -> f64 {
        let node = ctx.graph.node(v);
        self.pos(v) + self.inner_shift[v] + node.size.height + node.margin.bottom
    }

    /// How far, up to `delta`, the block containing `v` can move up.
    pub fn check_space_above(&self, ctx: &BkContext<'_>, v: NodeId, delta: f64) -> f64 {
        let mut available = delta;
        for member in self.block(self.root[v]) {
            if let Some(upper) = ctx.nb.above(member) {
                let space = self.min_y(ctx, member)
                    - (self.max_y(ctx, upper) + ctx.spacing_between(member, upper));
                available = available.min(space);
            }
        }
        available.max(0.0)
    }

    /// How far, up to `delta`, the block containing `v` can move down.
    pub fn check_space_below(&self, ctx: &BkContext<'_>, v: NodeId, delta: f64) -> f64 {
        let mut available = delta;
        for member in self.block(self.root[v]) {
            if let Some(lower) = ctx.nb.below(member) {
                let space = self.min_y(ctx, lower)
                    - (self.max_y(ctx, member) + ctx.spacing_between(member, lower));
                available = available.min(space);
            }
        }
        available.max(0.0)
    }
}
