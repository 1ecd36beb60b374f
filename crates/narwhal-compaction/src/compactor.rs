//! The compaction driver: direction handling, constraint sources, lock predicate.

use crate::cgraph::{Axis, CGraph, CNode};
use crate::error::{Error, Result};
use crate::longest_path::{self, Adjacency};
use crate::scanline_constraints;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Horizontal,
            Direction::Up | Direction::Down => Axis::Vertical,
        }
    }

    fn is_transposed(self) -> bool {
        self.axis() == Axis::Vertical
    }

    fn is_mirrored(self) -> bool {
        matches!(self, Direction::Right | Direction::Down)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConstraintSource {
    /// Constraints added with [`CGraph::add_constraint`].
    Predefined,
    /// Overlap constraints derived by a scanline sweep.
    #[default]
    Scanline,
}

type LockFn<'g> = Box<dyn Fn(&CNode, Direction) -> bool + 'g>;

pub struct OneDimensionalCompactor<'g> {
    graph: &'g mut CGraph,
    lock: Option<LockFn<'g>>,
    spacing: f64,
    source: ConstraintSource,
    direction: Direction,
}

impl<'g> OneDimensionalCompactor<'g> {
    pub fn new(graph: &'g mut CGraph) -> Self {
        Self {
            graph,
            lock: None,
            spacing: 0.0,
            source: ConstraintSource::default(),
            direction: Direction::Left,
        }
    }

    /// Locked nodes keep their position when compacting in the given direction.
    pub fn with_lock(mut self, lock: impl Fn(&CNode, Direction) -> bool + 'g) -> Self {
        self.lock = Some(Box::new(lock));
        self
    }

    /// Gap used for scanline-derived constraints.
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_constraint_source(mut self, source: ConstraintSource) -> Self {
        self.source = source;
        self
    }

    pub fn change_direction(&mut self, direction: Direction) -> &mut Self {
        self.direction = direction;
        self
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Compacts all nodes in the current direction.
    pub fn compact(&mut self) -> Result<&mut Self> {
        let direction = self.direction;
        if self.source == ConstraintSource::Predefined {
            if let Some(c) = self
                .graph
                .predefined
                .iter()
                .find(|c| c.axis != direction.axis())
            {
                return Err(Error::UnsupportedConfiguration {
                    reason: format!(
                        "predefined constraint {} -> {} is {:?} but compaction runs {:?}",
                        c.source, c.target, c.axis, direction
                    ),
                });
            }
        }

        let locked: Vec<bool> = match &self.lock {
            Some(lock) => self.graph.nodes.iter().map(|n| lock(n, direction)).collect(),
            None => vec![false; self.graph.nodes.len()],
        };

        let _span = tracing::debug_span!(
            "compact",
            ?direction,
            nodes = self.graph.nodes.len()
        )
        .entered();

        self.transform(direction, true);
        let adjacency = self.adjacency(direction);
        let result = longest_path::compact(&mut self.graph.nodes, &adjacency, &locked);
        self.transform(direction, false);
        result?;

        tracing::debug!(
            constraints = adjacency.iter().map(Vec::len).sum::<usize>(),
            "compaction finished"
        );
        Ok(self)
    }

    fn adjacency(&self, direction: Direction) -> Adjacency {
        let mut adj: Adjacency = vec![Vec::new(); self.graph.nodes.len()];
        match self.source {
            ConstraintSource::Predefined => {
                for c in &self.graph.predefined {
                    let (s, t) = if direction.is_mirrored() {
                        (c.target, c.source)
                    } else {
                        (c.source, c.target)
                    };
                    adj[s.index()].push((t.index(), c.gap));
                }
            }
            ConstraintSource::Scanline => {
                let boxes: Vec<_> = self.graph.nodes.iter().map(|n| n.hitbox).collect();
                for (s, t) in scanline_constraints::calculate(&boxes, self.spacing) {
                    adj[s].push((t, self.spacing));
                }
            }
        }
        adj
    }

    /// Maps hitboxes into the frame where compaction goes left (`forward`), or back.
    fn transform(&mut self, direction: Direction, forward: bool) {
        for node in &mut self.graph.nodes {
            let r = &mut node.hitbox;
            if forward {
                if direction.is_transposed() {
                    r.transpose();
                }
                if direction.is_mirrored() {
                    r.mirror_x();
                }
            } else {
                if direction.is_mirrored() {
                    r.mirror_x();
                }
                if direction.is_transposed() {
                    r.transpose();
                }
            }
        }
    }
}
