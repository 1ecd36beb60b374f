//! Orthogonal edge routing.
//!
//! Walks the layers left to right, placing each layer at its x coordinate and routing the
//! edges of the gap after it. Every gap gets as many vertical routing slots as its
//! hypernodes need; the gap width follows from the slot count.

pub mod hypernodes;

pub use hypernodes::{Dependency, HyperNode};

use crate::config::{LayeredConfig, Spacings};
use crate::error::Result;
use indexmap::IndexMap;
use narwhal_graph::{LGraph, LayerId, NodeId, Point};
use serde::Serialize;

/// Share of the edge spacing under which two horizontal segments count as a conflict.
const CONFLICT_THRESHOLD_FACTOR: f64 = 0.2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapReport {
    /// Distinct vertical routing slots used in the gap.
    pub slots: usize,
    /// Crossings introduced by breaking dependency cycles.
    pub crossings: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HyperNodeDump {
    pub ports: Vec<String>,
    pub start: f64,
    pub end: f64,
    pub slot: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapDump {
    pub start_x: f64,
    pub slots: usize,
    pub crossings: usize,
    pub hypernodes: Vec<HyperNodeDump>,
    /// Dependencies that survived cycle breaking.
    pub dependencies: Vec<Dependency>,
}

/// Per-gap routing state, keyed `"<left layer>-<right layer>"`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RoutingDump {
    pub gaps: IndexMap<String, GapDump>,
}

#[derive(Debug, Clone, Default)]
pub struct RoutingReport {
    pub gaps: Vec<GapReport>,
    pub dump: Option<RoutingDump>,
}

/// Places layers along x and routes every gap. Expects a proper layering: all edges connect
/// adjacent layers.
pub fn route_edges(graph: &mut LGraph, config: &LayeredConfig) -> Result<RoutingReport> {
    let _span = tracing::debug_span!("route_edges", layers = graph.layer_count()).entered();
    let spacing = &config.spacing;

    let layer_ids: Vec<LayerId> = graph.layer_ids().collect();
    let mut report = RoutingReport::default();
    let mut dump = config.diagnostics.then(RoutingDump::default);
    let mut x = 0.0;

    for (i, &layer) in layer_ids.iter().enumerate() {
        x += place_layer(graph, layer, x);
        let Some(&right) = layer_ids.get(i + 1) else {
            break;
        };

        let start = x + spacing.edge_node_between_layers;
        let left_nodes = graph.layer(layer).nodes().to_vec();
        let right_nodes = graph.layer(right).nodes().to_vec();
        let (gap, gap_dump) = route_gap(graph, &left_nodes, &right_nodes, start, spacing);
        if let Some(dump) = dump.as_mut() {
            dump.gaps.insert(format!("{layer}-{right}"), gap_dump);
        }
        x += gap_width(gap.slots, spacing);
        tracing::trace!(gap = i, slots = gap.slots, crossings = gap.crossings, "gap routed");
        report.gaps.push(gap);
    }

    graph.size.width = x;
    graph.size.height = graph
        .layers()
        .iter()
        .flat_map(|l| l.nodes().iter())
        .map(|&n| {
            let node = graph.node(n);
            node.position.y + node.size.height + node.margin.bottom
        })
        .fold(0.0, f64::max);

    tracing::debug!(
        slots = report.gaps.iter().map(|g| g.slots).sum::<usize>(),
        width = graph.size.width,
        "edges routed"
    );
    report.dump = dump;
    Ok(report)
}

/// Horizontal distance from the end of one layer to the start of the next.
fn gap_width(slots: usize, spacing: &Spacings) -> f64 {
    if slots == 0 {
        return spacing.node_node_between_layers;
    }
    let routed = 2.0 * spacing.edge_node_between_layers
        + (slots - 1) as f64 * spacing.edge_edge_between_layers;
    routed.max(spacing.node_node_between_layers)
}

/// Centres the nodes of `layer` in a column starting at `x`. Returns the column width.
fn place_layer(graph: &mut LGraph, layer: LayerId, x: f64) -> f64 {
    let nodes: Vec<NodeId> = graph.layer(layer).nodes().to_vec();
    let outer = |graph: &LGraph, n: NodeId| {
        let node = graph.node(n);
        node.margin.left + node.size.width + node.margin.right
    };
    let width = nodes.iter().map(|&n| outer(graph, n)).fold(0.0, f64::max);
    for &n in &nodes {
        let slack = width - outer(graph, n);
        let node = graph.node_mut(n);
        node.position.x = x + slack / 2.0 + node.margin.left;
    }
    let l = graph.layer_mut(layer);
    l.x = x;
    l.width = width;
    width
}

fn route_gap(
    graph: &mut LGraph,
    left: &[NodeId],
    right: &[NodeId],
    start: f64,
    spacing: &Spacings,
) -> (GapReport, GapDump) {
    let threshold = CONFLICT_THRESHOLD_FACTOR * spacing.edge_edge_between_layers;
    let mut hns = hypernodes::build(graph, left, right);
    let mut deps = hypernodes::dependencies(&hns, threshold);
    let crossings = hypernodes::break_cycles(hns.len(), &mut deps);
    let slots = hypernodes::assign_slots(&mut hns, &deps, threshold);

    for hn in &hns {
        if !hn.is_straight() {
            bend_points(graph, hn, start + hn.slot as f64 * spacing.edge_edge_between_layers);
        }
    }

    let dump = GapDump {
        start_x: start,
        slots,
        crossings,
        hypernodes: hns
            .iter()
            .map(|h| HyperNodeDump {
                ports: h.ports.iter().map(ToString::to_string).collect(),
                start: h.start,
                end: h.end,
                slot: (!h.is_straight()).then_some(h.slot),
            })
            .collect(),
        dependencies: deps.into_iter().filter(|d| d.active).collect(),
    };
    (GapReport { slots, crossings }, dump)
}

fn bend_points(graph: &mut LGraph, hn: &HyperNode, x: f64) {
    let mut junctions: Vec<Point> = Vec::new();
    for &port in &hn.sources {
        let source_y = graph.port_absolute_anchor(port).y;
        for e in graph.port(port).outgoing().to_vec() {
            if !hn.ports.contains(&graph.edge(e).target()) {
                continue;
            }
            let target_y = graph.port_absolute_anchor(graph.edge(e).target()).y;
            if (source_y - target_y).abs() <= hypernodes::TOLERANCE {
                continue;
            }
            for y in [source_y, target_y] {
                let point = Point::new(x, y);
                graph.edge_mut(e).bend_points.push(point);
                if needs_junction(hn, y)
                    && !junctions.iter().any(|j| same_point(*j, point))
                {
                    junctions.push(point);
                    graph.edge_mut(e).junction_points.push(point);
                }
            }
        }
    }
}

/// The vertical segment continues past `y`, so other edges branch off here.
fn needs_junction(hn: &HyperNode, y: f64) -> bool {
    let near = |a: f64| (y - a).abs() < hypernodes::TOLERANCE;
    let inside = y > hn.start && y < hn.end;
    let shared_end = match (
        hn.source_positions.first(),
        hn.target_positions.first(),
        hn.source_positions.last(),
        hn.target_positions.last(),
    ) {
        (Some(&sf), Some(&tf), Some(&sl), Some(&tl)) => {
            (near(sf) && near(tf)) || (near(sl) && near(tl))
        }
        _ => false,
    };
    inside || shared_end
}

fn same_point(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < hypernodes::TOLERANCE && (a.y - b.y).abs() < hypernodes::TOLERANCE
}
