//! Horizontal compaction of one pass: blocks are placed relative to their class sink, then
//! classes are separated by the one-dimensional compaction engine.

use super::BkContext;
use super::layout::{AlignedLayout, HDirection, VDirection};
use super::threshold::ThresholdStrategy;
use crate::error::Result;
use narwhal_compaction::{
    Axis, CGraph, CGraphDump, CNodeId, ConstraintSource, Direction, OneDimensionalCompactor, Rect,
};
use narwhal_graph::{NodeId, NodeMap};

/// Required separation between two classes: `shift(to) - shift(from)` in an up pass, the
/// reverse in a down pass.
struct ClassEdge {
    from: NodeId,
    to: NodeId,
    separation: f64,
}

struct Frame {
    root: NodeId,
    current: NodeId,
    thresh: f64,
    initial: bool,
    /// Neighbour of `current` whose block is being placed before `current` continues.
    waiting: Option<NodeId>,
}

struct BlockPlacer<'c, 'g> {
    ctx: &'c BkContext<'g>,
    layout: &'c mut AlignedLayout,
    threshold: ThresholdStrategy,
    class_edges: Vec<ClassEdge>,
}

pub(super) fn horizontal_compaction(
    ctx: &BkContext<'_>,
    layout: &mut AlignedLayout,
    straighten: bool,
) -> Result<CGraphDump> {
    for v in ctx.nb.nodes() {
        layout.sink[v] = v;
        layout.shift[v] = None;
        layout.y[v] = None;
    }

    let mut layers: Vec<&Vec<NodeId>> = ctx.nb.layers.iter().collect();
    if layout.hdir == HDirection::Left {
        layers.reverse();
    }

    let mut placer = BlockPlacer {
        ctx,
        layout,
        threshold: ThresholdStrategy::new(ctx, straighten),
        class_edges: Vec::new(),
    };
    for layer in layers {
        let nodes: Vec<NodeId> = match placer.layout.vdir {
            VDirection::Up => layer.iter().rev().copied().collect(),
            VDirection::Down => layer.clone(),
        };
        for v in nodes {
            if placer.layout.root[v] == v {
                placer.place_block(v);
            }
        }
    }

    let BlockPlacer {
        layout,
        mut threshold,
        class_edges,
        ..
    } = placer;
    let dump = place_classes(ctx, layout, &class_edges)?;

    let roots: Vec<NodeId> = ctx.nb.nodes().filter(|&v| layout.root[v] == v).collect();
    for &r in &roots {
        if let (Some(y), Some(shift)) = (layout.y[r], layout.shift[layout.sink[r]]) {
            layout.y[r] = Some(y + shift);
        }
    }
    for v in ctx.nb.nodes() {
        layout.y[v] = layout.y[layout.root[v]];
    }

    threshold.post_process(ctx, layout);
    Ok(dump)
}

impl BlockPlacer<'_, '_> {
    fn neighbor(&self, v: NodeId) -> Option<NodeId> {
        match self.layout.vdir {
            VDirection::Down => self.ctx.nb.above(v),
            VDirection::Up => self.ctx.nb.below(v),
        }
    }

    fn y(&self, v: NodeId) -> f64 {
        self.layout.y[v].unwrap_or(0.0)
    }

    /// Places the block rooted at `start` and, first, every block it depends on. The
    /// recursion of the published algorithm runs on an explicit stack.
    fn place_block(&mut self, start: NodeId) {
        if self.layout.y[start].is_some() {
            return;
        }
        let invalid = ThresholdStrategy::invalid(self.layout);
        self.layout.y[start] = Some(0.0);
        let mut stack = vec![Frame::new(start, invalid)];

        while let Some(top) = stack.len().checked_sub(1) {
            let current = stack[top].current;
            match stack[top].waiting.take() {
                None => {
                    if let Some(neighbor) = self.neighbor(current) {
                        stack[top].waiting = Some(neighbor);
                        let neighbor_root = self.layout.root[neighbor];
                        if self.layout.y[neighbor_root].is_none() {
                            self.layout.y[neighbor_root] = Some(0.0);
                            stack.push(Frame::new(neighbor_root, invalid));
                        }
                        continue;
                    }
                    let (root, old) = (stack[top].root, stack[top].thresh);
                    stack[top].thresh =
                        self.threshold
                            .calculate(self.ctx, self.layout, old, root, current);
                }
                Some(neighbor) => self.separate(&mut stack[top], neighbor),
            }

            let frame = &mut stack[top];
            frame.current = self.layout.align[frame.current];
            if frame.current == frame.root {
                let root = frame.root;
                stack.pop();
                self.threshold.finish_block(root);
            }
        }
    }

    /// Positions the frame's block against the already placed block of `neighbor`, or records
    /// a class separation if the two belong to different classes.
    fn separate(&mut self, frame: &mut Frame, neighbor: NodeId) {
        let (root, current) = (frame.root, frame.current);
        let neighbor_root = self.layout.root[neighbor];
        frame.thresh =
            self.threshold
                .calculate(self.ctx, self.layout, frame.thresh, root, current);

        if self.layout.sink[root] == root {
            self.layout.sink[root] = self.layout.sink[neighbor_root];
        }

        let graph = self.ctx.graph;
        let cur = graph.node(current);
        let nb = graph.node(neighbor);
        let spacing = self.ctx.spacing_between(current, neighbor);
        let is = &self.layout.inner_shift;

        if self.layout.sink[root] == self.layout.sink[neighbor_root] {
            let (new_pos, bounded) = match self.layout.vdir {
                VDirection::Up => {
                    let p = self.y(neighbor_root) + is[neighbor]
                        - nb.margin.top
                        - spacing
                        - cur.margin.bottom
                        - cur.size.height
                        - is[current];
                    let b = if frame.initial {
                        p.min(frame.thresh)
                    } else {
                        self.y(root).min(p).min(frame.thresh)
                    };
                    (p, b)
                }
                VDirection::Down => {
                    let p = self.y(neighbor_root)
                        + is[neighbor]
                        + nb.size.height
                        + nb.margin.bottom
                        + spacing
                        + cur.margin.top
                        - is[current];
                    let b = if frame.initial {
                        p.max(frame.thresh)
                    } else {
                        self.y(root).max(p).max(frame.thresh)
                    };
                    (p, b)
                }
            };
            tracing::trace!(block = %root, new_pos, y = bounded, "block placed");
            self.layout.y[root] = Some(bounded);
            frame.initial = false;
        } else {
            let separation = match self.layout.vdir {
                VDirection::Up => {
                    self.y(root) + is[current] + cur.size.height + cur.margin.bottom + spacing
                        - (self.y(neighbor_root) + is[neighbor] - nb.margin.top)
                }
                VDirection::Down => {
                    self.y(root) + is[current]
                        - cur.margin.top
                        - self.y(neighbor_root)
                        - is[neighbor]
                        - nb.size.height
                        - nb.margin.bottom
                        - spacing
                }
            };
            self.class_edges.push(ClassEdge {
                from: self.layout.sink[root],
                to: self.layout.sink[neighbor_root],
                separation,
            });
        }
    }
}

impl Frame {
    fn new(root: NodeId, thresh: f64) -> Self {
        Self {
            root,
            current: root,
            thresh,
            initial: true,
            waiting: None,
        }
    }
}

/// Solves the class separations as a longest-path problem. Down passes place classes on
/// negated coordinates so that both directions become "push forward" constraints.
fn place_classes(
    ctx: &BkContext<'_>,
    layout: &mut AlignedLayout,
    class_edges: &[ClassEdge],
) -> Result<CGraphDump> {
    let mut cgraph = CGraph::new();
    let mut class_node: NodeMap<Option<CNodeId>> = NodeMap::new(ctx.graph, None);
    let mut node_for = |cgraph: &mut CGraph, sink: NodeId| -> CNodeId {
        *class_node[sink].get_or_insert_with(|| {
            cgraph.add_node(
                ctx.graph.node(sink).name.clone(),
                Rect::new(0.0, 0.0, 0.0, 0.0),
            )
        })
    };

    let sign = match layout.vdir {
        VDirection::Up => 1.0,
        VDirection::Down => -1.0,
    };
    let mut sinks = Vec::new();
    for edge in class_edges {
        let from = node_for(&mut cgraph, edge.from);
        let to = node_for(&mut cgraph, edge.to);
        cgraph.add_constraint(Axis::Horizontal, from, to, sign * edge.separation);
        sinks.push((edge.from, from));
        sinks.push((edge.to, to));
    }
    if class_edges.is_empty() {
        return Ok(cgraph.dump());
    }

    OneDimensionalCompactor::new(&mut cgraph)
        .with_constraint_source(ConstraintSource::Predefined)
        .change_direction(Direction::Left)
        .compact()?;

    for (sink, id) in sinks {
        layout.shift[sink] = Some(sign * cgraph.node(id).hitbox.x);
    }
    tracing::trace!(
        layout = ?layout.kind,
        classes = cgraph.node_count(),
        separations = class_edges.len(),
        "classes placed"
    );
    Ok(cgraph.dump())
}
