//! Storage entries for [`LGraph`](super::LGraph).

use crate::geometry::{Margins, Point, Size};
use crate::ids::{EdgeId, LayerId, NodeId, PortId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortSide {
    North,
    East,
    South,
    West,
}

impl PortSide {
    pub const ALL: [PortSide; 4] = [
        PortSide::North,
        PortSide::East,
        PortSide::South,
        PortSide::West,
    ];

    pub fn opposed(self) -> PortSide {
        match self {
            PortSide::North => PortSide::South,
            PortSide::East => PortSide::West,
            PortSide::South => PortSide::North,
            PortSide::West => PortSide::East,
        }
    }

    /// Next side in clockwise direction.
    pub fn right(self) -> PortSide {
        match self {
            PortSide::North => PortSide::East,
            PortSide::East => PortSide::South,
            PortSide::South => PortSide::West,
            PortSide::West => PortSide::North,
        }
    }

    /// Next side in counter-clockwise direction.
    pub fn left(self) -> PortSide {
        match self {
            PortSide::North => PortSide::West,
            PortSide::East => PortSide::North,
            PortSide::South => PortSide::East,
            PortSide::West => PortSide::South,
        }
    }

    pub fn ordinal(self) -> usize {
        match self {
            PortSide::North => 0,
            PortSide::East => 1,
            PortSide::South => 2,
            PortSide::West => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NodeKind {
    #[default]
    Normal,
    /// Placeholder for one intermediate layer of a long edge. `origin` is the edge the chain
    /// was split from.
    LongEdge { origin: EdgeId },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub size: Size,
    pub margin: Margins,
    /// Top-left corner.
    pub position: Point,
    /// Caller-provided coordinates, consumed by the interactive cycle breaker.
    pub input_position: Option<Point>,
    pub(crate) ports: Vec<PortId>,
    pub(crate) layer: Option<LayerId>,
    pub(crate) removed: bool,
}

impl Node {
    pub fn ports(&self) -> &[PortId] {
        &self.ports
    }

    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    pub fn is_dummy(&self) -> bool {
        !matches!(self.kind, NodeKind::Normal)
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }
}

#[derive(Debug, Clone)]
pub struct Port {
    pub node: NodeId,
    pub side: PortSide,
    /// Top-left of the port relative to its node.
    pub position: Point,
    /// Attachment point relative to `position`.
    pub anchor: Point,
    /// Fixed ports keep the position the caller gave them.
    pub fixed: bool,
    pub(crate) incoming: Vec<EdgeId>,
    pub(crate) outgoing: Vec<EdgeId>,
}

impl Port {
    pub fn incoming(&self) -> &[EdgeId] {
        &self.incoming
    }

    pub fn outgoing(&self) -> &[EdgeId] {
        &self.outgoing
    }

    pub fn degree(&self) -> usize {
        self.incoming.len() + self.outgoing.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeState {
    Active,
    Hidden,
    Removed,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub(crate) source: PortId,
    pub(crate) target: PortId,
    pub weight: f64,
    pub priority: i32,
    /// Minimum layer span.
    pub delta: u32,
    pub reversed: bool,
    pub bend_points: Vec<Point>,
    pub junction_points: Vec<Point>,
    pub(crate) state: EdgeState,
}

impl Edge {
    pub fn source(&self) -> PortId {
        self.source
    }

    pub fn target(&self) -> PortId {
        self.target
    }

    pub fn is_active(&self) -> bool {
        self.state == EdgeState::Active
    }

    pub fn is_hidden(&self) -> bool {
        self.state == EdgeState::Hidden
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub(crate) nodes: Vec<NodeId>,
    /// Left border, set by edge routing.
    pub x: f64,
    /// Widest node including margins.
    pub width: f64,
}

impl Layer {
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
