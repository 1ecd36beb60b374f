//! Self-loops.
//!
//! Loops never take part in layering or crossing minimization: [`prepare`] hides them right at
//! the start, [`route`] lays them around their node once port positions are final and grows the
//! node's margins to make room, and [`restore`] brings them back with absolute bend points
//! after placement.

use crate::config::LayeredConfig;
use crate::error::{Error, Result};
use narwhal_graph::{EdgeId, LGraph, NodeId, Point, PortId, PortSide, Size};

#[derive(Debug, Clone)]
pub struct SelfLoop {
    pub edge: EdgeId,
    pub node: NodeId,
    pub source_side: PortSide,
    pub target_side: PortSide,
    pub clockwise: bool,
    /// Distance rank around the node, 0 innermost.
    pub level: usize,
    /// Bend points relative to the node's top-left corner.
    pub(crate) bends: Vec<Point>,
}

impl SelfLoop {
    /// Node sides the loop runs along, from the source side to the target side.
    pub fn sides(&self) -> Vec<PortSide> {
        let mut sides = vec![self.source_side];
        let mut side = self.source_side;
        while side != self.target_side {
            side = if self.clockwise { side.right() } else { side.left() };
            sides.push(side);
        }
        sides
    }
}

/// Hidden self-loops, carried from [`prepare`] to [`restore`].
#[derive(Debug, Clone, Default)]
pub struct SelfLoops {
    pub loops: Vec<SelfLoop>,
}

impl SelfLoops {
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }
}

/// Hides every self-loop. Free loop ports without other edges move to their default side:
/// East for the source, North for the target.
pub fn prepare(graph: &mut LGraph) -> Result<SelfLoops> {
    let edges: Vec<EdgeId> = graph.edge_ids().filter(|&e| graph.is_self_loop(e)).collect();
    let mut loops = Vec::with_capacity(edges.len());
    for e in edges {
        graph.hide_edge(e);
        let (source, target) = (graph.edge(e).source(), graph.edge(e).target());
        default_side(graph, source, PortSide::East);
        default_side(graph, target, PortSide::North);

        let (source_side, target_side) = (graph.port(source).side, graph.port(target).side);
        let clockwise = if source_side == target_side {
            source < target
        } else {
            target_side == source_side.right()
        };
        loops.push(SelfLoop {
            edge: e,
            node: graph.port(source).node,
            source_side,
            target_side,
            clockwise,
            level: 0,
            bends: Vec::new(),
        });
    }
    tracing::debug!(loops = loops.len(), "self-loops hidden");
    Ok(SelfLoops { loops })
}

fn default_side(graph: &mut LGraph, port: PortId, side: PortSide) {
    let p = graph.port(port);
    if !p.fixed && p.degree() == 0 {
        graph.port_mut(port).side = side;
    }
}

/// Assigns loop levels per node, computes relative bend points and widens node margins so
/// that placement keeps other elements clear of the loops.
pub fn route(graph: &mut LGraph, loops: &mut SelfLoops, config: &LayeredConfig) -> Result<()> {
    let spacing = &config.spacing;
    let mut order: Vec<usize> = (0..loops.loops.len()).collect();
    order.sort_by_key(|&i| {
        let l = &loops.loops[i];
        (l.node, l.sides().len(), l.edge)
    });

    let mut previous: Option<NodeId> = None;
    let mut level = 0;
    for i in order {
        let node = loops.loops[i].node;
        if previous != Some(node) {
            level = 0;
        }
        previous = Some(node);

        let sl = &mut loops.loops[i];
        sl.level = level;
        level += 1;

        let offset = spacing.node_self_loop + sl.level as f64 * spacing.edge_edge;
        let (source, target) = (graph.edge(sl.edge).source(), graph.edge(sl.edge).target());
        let size = graph.node(node).size;
        let project = |port: PortId| {
            let p = graph.port(port);
            outside(p.side, size, offset, p.position + p.anchor)
        };

        let sides = sl.sides();
        let mut bends = vec![project(source)];
        for pair in sides.windows(2) {
            let along = outside(pair[1], size, offset, Point::default());
            bends.push(outside(pair[0], size, offset, along));
        }
        bends.push(project(target));
        sl.bends = bends;

        let margin = &mut graph.node_mut(node).margin;
        for side in sides {
            let m = match side {
                PortSide::North => &mut margin.top,
                PortSide::East => &mut margin.right,
                PortSide::South => &mut margin.bottom,
                PortSide::West => &mut margin.left,
            };
            *m = m.max(offset);
        }
    }
    Ok(())
}

/// `point` moved onto the line running `offset` outside `side`; the other coordinate stays.
fn outside(side: PortSide, size: Size, offset: f64, point: Point) -> Point {
    match side {
        PortSide::North => Point::new(point.x, -offset),
        PortSide::East => Point::new(size.width + offset, point.y),
        PortSide::South => Point::new(point.x, size.height + offset),
        PortSide::West => Point::new(-offset, point.y),
    }
}

/// Brings the loops back as ordinary edges with absolute bend points. Returns how many were
/// restored.
pub fn restore(graph: &mut LGraph, loops: SelfLoops) -> Result<usize> {
    let count = loops.len();
    for sl in loops.loops {
        if graph.node(sl.node).is_removed() {
            return Err(Error::PreconditionViolation {
                element: sl.edge.to_string(),
                reason: format!("self-loop node {} was removed", sl.node),
            });
        }
        let origin = graph.node(sl.node).position;
        graph.restore_edge(sl.edge);
        let edge = graph.edge_mut(sl.edge);
        edge.bend_points = sl.bends.into_iter().map(|b| origin + b).collect();
        edge.junction_points.clear();
    }
    Ok(count)
}
