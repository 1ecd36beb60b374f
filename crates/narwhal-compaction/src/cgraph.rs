//! Constraint graph of boxes.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CNodeId(u32);

impl CNodeId {
    pub fn from_index(ix: usize) -> Self {
        Self(ix as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for CNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub(crate) fn mirror_x(&mut self) {
        self.x = -self.x - self.width;
    }

    pub(crate) fn transpose(&mut self) {
        std::mem::swap(&mut self.x, &mut self.y);
        std::mem::swap(&mut self.width, &mut self.height);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone)]
pub struct CNode {
    pub name: String,
    pub hitbox: Rect,
}

/// `target` must start at least `gap` after `source` ends, along `axis`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub source: CNodeId,
    pub target: CNodeId,
    pub gap: f64,
    pub axis: Axis,
}

#[derive(Debug, Clone, Default)]
pub struct CGraph {
    pub(crate) nodes: Vec<CNode>,
    pub(crate) predefined: Vec<Constraint>,
}

impl CGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, hitbox: Rect) -> CNodeId {
        self.nodes.push(CNode {
            name: name.into(),
            hitbox,
        });
        CNodeId::from_index(self.nodes.len() - 1)
    }

    pub fn add_constraint(&mut self, axis: Axis, source: CNodeId, target: CNodeId, gap: f64) {
        self.predefined.push(Constraint {
            source,
            target,
            gap,
            axis,
        });
    }

    pub fn node(&self, id: CNodeId) -> &CNode {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: CNodeId) -> &mut CNode {
        &mut self.nodes[id.index()]
    }

    pub fn nodes(&self) -> &[CNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.predefined
    }

    pub fn node_ids(&self) -> impl Iterator<Item = CNodeId> + '_ {
        (0..self.nodes.len()).map(CNodeId::from_index)
    }
}
