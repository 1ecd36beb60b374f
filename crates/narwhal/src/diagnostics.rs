//! Serializable snapshots of the working structures, for external visualization.

use crate::position::ClassGraphDump;
use crate::rank::NGraphDump;
use crate::routing::RoutingDump;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    /// Network-simplex graph after layering.
    pub simplex: Option<NGraphDump>,
    /// Brandes-Köpf class graphs, one per computed pass.
    pub class_graphs: Vec<ClassGraphDump>,
    pub routing: Option<RoutingDump>,
}

impl Diagnostics {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
