//! Serializable snapshot of a [`CGraph`] for external visualization.

use crate::cgraph::{CGraph, Constraint, Rect};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CNodeDump {
    pub id: usize,
    pub name: String,
    pub hitbox: Rect,
}

#[derive(Debug, Clone, Serialize)]
pub struct CGraphDump {
    pub nodes: Vec<CNodeDump>,
    pub constraints: Vec<Constraint>,
}

impl CGraph {
    pub fn dump(&self) -> CGraphDump {
        CGraphDump {
            nodes: self
                .nodes
                .iter()
                .enumerate()
                .map(|(id, n)| CNodeDump {
                    id,
                    name: n.name.clone(),
                    hitbox: n.hitbox,
                })
                .collect(),
            constraints: self.predefined.clone(),
        }
    }
}
