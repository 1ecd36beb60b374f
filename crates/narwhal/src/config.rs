//! Layout configuration.
//!
//! Every strategy is a plain enum dispatched by the phase that owns it. The whole struct is
//! serde-friendly so callers can keep it next to their own settings.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CycleBreakingStrategy {
    DepthFirst,
    #[default]
    Greedy,
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossingMinimizationHeuristic {
    #[default]
    Barycenter,
    Median,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodePlacementStrategy {
    #[default]
    BrandesKoepf,
    Simple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BkCompactionStrategy {
    #[default]
    Classic,
    ImproveStraightness,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FixedAlignment {
    #[default]
    None,
    LeftUp,
    RightUp,
    LeftDown,
    RightDown,
    Balanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Spacings {
    /// Between two regular nodes of the same layer.
    pub node_node: f64,
    /// Between a long-edge dummy and a regular node of the same layer.
    pub edge_node: f64,
    /// Between two long-edge dummies of the same layer.
    pub edge_edge: f64,
    pub node_node_between_layers: f64,
    pub edge_node_between_layers: f64,
    pub edge_edge_between_layers: f64,
    pub node_self_loop: f64,
}

impl Default for Spacings {
    fn default() -> Self {
        Self {
            node_node: 20.0,
            edge_node: 10.0,
            edge_edge: 10.0,
            node_node_between_layers: 20.0,
            edge_node_between_layers: 10.0,
            edge_edge_between_layers: 10.0,
            node_self_loop: 10.0,
        }
    }
}

impl Spacings {
    fn fields(&self) -> [(&'static str, f64); 7] {
        [
            ("nodeNode", self.node_node),
            ("edgeNode", self.edge_node),
            ("edgeEdge", self.edge_edge),
            ("nodeNodeBetweenLayers", self.node_node_between_layers),
            ("edgeNodeBetweenLayers", self.edge_node_between_layers),
            ("edgeEdgeBetweenLayers", self.edge_edge_between_layers),
            ("nodeSelfLoop", self.node_self_loop),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NetworkSimplexConfig {
    /// Move nodes with equal in/out weight to the least crowded feasible layer.
    pub balance: bool,
    /// Upper bound on pivots per connected component.
    pub iteration_limit: u32,
}

impl Default for NetworkSimplexConfig {
    fn default() -> Self {
        Self {
            balance: true,
            iteration_limit: u32::MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayeredConfig {
    pub cycle_breaking: CycleBreakingStrategy,
    pub network_simplex: NetworkSimplexConfig,
    pub crossing_minimization: CrossingMinimizationHeuristic,
    pub sweep_iterations: u32,
    pub node_placement: NodePlacementStrategy,
    pub bk_compaction: BkCompactionStrategy,
    pub bk_fixed_alignment: FixedAlignment,
    pub spacing: Spacings,
    /// Collect serializable snapshots of the working graphs.
    pub diagnostics: bool,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            cycle_breaking: CycleBreakingStrategy::default(),
            network_simplex: NetworkSimplexConfig::default(),
            crossing_minimization: CrossingMinimizationHeuristic::default(),
            sweep_iterations: 24,
            node_placement: NodePlacementStrategy::default(),
            bk_compaction: BkCompactionStrategy::default(),
            bk_fixed_alignment: FixedAlignment::default(),
            spacing: Spacings::default(),
            diagnostics: false,
        }
    }
}

impl LayeredConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.spacing.fields() {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::unsupported(format!(
                    "spacing `{name}` must be a finite non-negative number, got {value}"
                )));
            }
        }
        if self.sweep_iterations == 0 {
            return Err(Error::unsupported("sweepIterations must be at least 1"));
        }
        Ok(())
    }
}
