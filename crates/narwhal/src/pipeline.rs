//! The phase driver.

use crate::config::LayeredConfig;
use crate::diagnostics::Diagnostics;
use crate::error::{Error, Result};
use crate::position::BkLayoutKind;
use crate::progress::ProgressMonitor;
use crate::routing::GapReport;
use crate::{cycles, long_edges, order, position, rank, routing, self_loops};
use narwhal_graph::{EdgeId, LGraph};

const PHASES: usize = 11;

/// What a layout run did, phase by phase.
#[derive(Debug, Clone, Default)]
pub struct LayoutReport {
    pub reversed_edges: usize,
    pub layer_count: usize,
    pub dummy_nodes: usize,
    pub self_loops: usize,
    /// Crossings between adjacent layers after ordering.
    pub crossings: usize,
    /// Routing result per layer gap, left to right.
    pub gaps: Vec<GapReport>,
    pub bk_layout: Option<BkLayoutKind>,
    pub diagnostics: Option<Diagnostics>,
}

/// Lays out `graph` in place.
///
/// Node positions, edge bend points and junction points, layer x ranges and the graph size are
/// written to the graph. Cancellation is checked before every phase; a phase that has started
/// runs to completion.
///
/// The phases work on a copy of `graph`. It replaces `graph` only when every phase succeeds, so
/// an error or a cancellation leaves the caller's graph untouched.
pub fn layout(
    graph: &mut LGraph,
    config: &LayeredConfig,
    monitor: &mut dyn ProgressMonitor,
) -> Result<LayoutReport> {
    config.validate()?;
    graph.validate()?;

    monitor.begin("Layered layout", PHASES as f64);
    let mut work = graph.clone();
    let result = run(&mut work, config, monitor);
    monitor.done();
    match result {
        Ok(report) => {
            *graph = work;
            Ok(report)
        }
        Err(err) => {
            tracing::warn!(%err, "layout aborted");
            Err(err)
        }
    }
}

fn run(
    graph: &mut LGraph,
    config: &LayeredConfig,
    monitor: &mut dyn ProgressMonitor,
) -> Result<LayoutReport> {
    let mut report = LayoutReport::default();
    let mut diagnostics = config.diagnostics.then(Diagnostics::default);

    let mut loops = phase(graph, monitor, "Self-loop preparation", self_loops::prepare)?;
    report.self_loops = loops.len();

    report.reversed_edges = phase(graph, monitor, "Cycle breaking", |g| {
        cycles::break_cycles(g, config)
    })?;

    let layering = phase(graph, monitor, "Layer assignment", |g| {
        rank::assign_layers(g, config)
    })?;
    report.layer_count = layering.layer_count;
    if let Some(d) = diagnostics.as_mut() {
        d.simplex = layering.dump;
    }

    report.dummy_nodes = phase(graph, monitor, "Long edge splitting", long_edges::split)?;

    report.crossings = phase(graph, monitor, "Crossing minimization", |g| {
        order::minimize_crossings(g, config)
    })?;

    phase(graph, monitor, "Self-loop routing", |g| {
        self_loops::route(g, &mut loops, config)
    })?;

    let placement = phase(graph, monitor, "Node placement", |g| {
        position::place_nodes(g, config)
    })?;
    report.bk_layout = placement.chosen;
    if let Some(d) = diagnostics.as_mut() {
        d.class_graphs = placement.class_graphs;
    }

    let routing = phase(graph, monitor, "Edge routing", |g| {
        routing::route_edges(g, config)
    })?;
    report.gaps = routing.gaps;
    if let Some(d) = diagnostics.as_mut() {
        d.routing = routing.dump;
    }

    phase(graph, monitor, "Self-loop restoration", |g| {
        self_loops::restore(g, loops)
    })?;

    phase(graph, monitor, "Long edge joining", |g| {
        long_edges::join(g);
        Ok(())
    })?;

    phase(graph, monitor, "Reversed edge restoration", |g| {
        restore_reversed(g);
        Ok(())
    })?;

    tracing::info!(
        layers = report.layer_count,
        reversed = report.reversed_edges,
        crossings = report.crossings,
        width = graph.size.width,
        height = graph.size.height,
        "layout finished"
    );
    report.diagnostics = diagnostics;
    Ok(report)
}

fn phase<T>(
    graph: &mut LGraph,
    monitor: &mut dyn ProgressMonitor,
    name: &'static str,
    f: impl FnOnce(&mut LGraph) -> Result<T>,
) -> Result<T> {
    if monitor.is_cancelled() {
        tracing::info!(phase = name, "layout cancelled");
        return Err(Error::Cancelled { phase: name });
    }
    let mut sub = monitor.subtask(1.0);
    sub.begin(name, 1.0);
    let result = f(graph);
    sub.done();
    result
}

/// Turns every reversed edge back, bend and junction points included.
fn restore_reversed(graph: &mut LGraph) {
    let reversed: Vec<EdgeId> = graph.edge_ids().filter(|&e| graph.edge(e).reversed).collect();
    for e in &reversed {
        graph.reverse_edge(*e, false);
    }
    tracing::debug!(edges = reversed.len(), "reversed edges restored");
}
