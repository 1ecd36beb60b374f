mod common;

use common::{arb_graph, is_acyclic};
use narwhal::cycles::{break_cycles, depth_first_fas, greedy_fas};
use narwhal::graph::{LGraph, NodeId, Point, PortSide, Size};
use narwhal::{CycleBreakingStrategy, Error, LayeredConfig};
use proptest::prelude::*;

fn node(g: &mut LGraph, name: &str) -> NodeId {
    g.add_node(name, Size::new(20.0, 20.0))
}

fn with_strategy(strategy: CycleBreakingStrategy) -> LayeredConfig {
    LayeredConfig {
        cycle_breaking: strategy,
        ..Default::default()
    }
}

/// Two interleaved cycles plus a self-loop: a -> b -> c -> a, c -> d -> b, d -> d.
fn tangled() -> LGraph {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    let c = node(&mut g, "c");
    let d = node(&mut g, "d");
    g.connect(a, b);
    g.connect(b, c);
    g.connect(c, a);
    g.connect(c, d);
    g.connect(d, b);
    g.connect(d, d);
    g
}

#[test]
fn acyclic_graph_is_left_alone() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    let c = node(&mut g, "c");
    g.connect(a, b);
    g.connect(b, c);
    g.connect(a, c);

    for strategy in [CycleBreakingStrategy::Greedy, CycleBreakingStrategy::DepthFirst] {
        assert!(greedy_fas(&g).is_empty());
        assert!(depth_first_fas(&g).is_empty());
        assert_eq!(break_cycles(&mut g, &with_strategy(strategy)).unwrap(), 0);
    }
}

#[test]
fn every_strategy_leaves_an_acyclic_graph() {
    for strategy in [CycleBreakingStrategy::Greedy, CycleBreakingStrategy::DepthFirst] {
        let mut g = tangled();
        let reversed = break_cycles(&mut g, &with_strategy(strategy)).unwrap();
        assert!(reversed >= 1, "{strategy:?}");
        assert!(is_acyclic(&g), "{strategy:?}");
        let flagged = g.edge_ids().filter(|&e| g.edge(e).reversed).count();
        assert_eq!(flagged, reversed);
    }
}

#[test]
fn self_loops_are_never_reversed() {
    let mut g = tangled();
    break_cycles(&mut g, &LayeredConfig::default()).unwrap();
    for e in g.edge_ids().filter(|&e| g.is_self_loop(e)) {
        assert!(!g.edge(e).reversed);
    }
}

#[test]
fn two_cycle_loses_exactly_one_edge() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    g.connect(a, b);
    g.connect(b, a);

    assert_eq!(greedy_fas(&g).len(), 1);
    assert_eq!(depth_first_fas(&g).len(), 1);
}

#[test]
fn greedy_prefers_keeping_high_priority_edges() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    let forward = g.connect(a, b);
    let backward = g.connect(b, a);
    g.edge_mut(backward).priority = 5;

    let fas = greedy_fas(&g);
    assert_eq!(fas, vec![forward]);
}

#[test]
fn reversed_edges_move_to_opposite_ports() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    g.connect(a, b);
    let back = g.connect(b, a);
    g.edge_mut(back).priority = 1;

    break_cycles(&mut g, &LayeredConfig::default()).unwrap();
    let reversed: Vec<_> = g.edge_ids().filter(|&e| g.edge(e).reversed).collect();
    assert_eq!(reversed.len(), 1);
    let e = reversed[0];
    assert_eq!(g.port(g.edge(e).source()).side, PortSide::East);
    assert_eq!(g.port(g.edge(e).target()).side, PortSide::West);
}

#[test]
fn interactive_follows_input_positions() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    let c = node(&mut g, "c");
    g.node_mut(a).input_position = Some(Point::new(200.0, 0.0));
    g.node_mut(b).input_position = Some(Point::new(0.0, 0.0));
    g.node_mut(c).input_position = Some(Point::new(100.0, 0.0));
    let ab = g.connect(a, b);
    let bc = g.connect(b, c);
    let ca = g.connect(c, a);

    let config = with_strategy(CycleBreakingStrategy::Interactive);
    let reversed = break_cycles(&mut g, &config).unwrap();
    assert_eq!(reversed, 1);
    assert!(g.edge(ab).reversed);
    assert!(!g.edge(bc).reversed);
    assert!(!g.edge(ca).reversed);
    assert!(is_acyclic(&g));
}

#[test]
fn interactive_without_positions_is_unsupported() {
    let mut g = tangled();
    let err = break_cycles(&mut g, &with_strategy(CycleBreakingStrategy::Interactive)).unwrap_err();
    assert!(matches!(err, Error::UnsupportedConfiguration { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_graphs_become_acyclic(shape in arb_graph(1..=40, 3)) {
        for strategy in [CycleBreakingStrategy::Greedy, CycleBreakingStrategy::DepthFirst] {
            let (mut g, _) = shape.build();
            let reversed = break_cycles(&mut g, &with_strategy(strategy)).unwrap();
            prop_assert!(is_acyclic(&g), "{:?}", strategy);
            let flagged = g.edge_ids().filter(|&e| g.edge(e).reversed).count();
            prop_assert_eq!(flagged, reversed);
            prop_assert!(g.edge_ids().filter(|&e| g.is_self_loop(e)).all(|e| !g.edge(e).reversed));
            prop_assert_eq!(g.edge_count(), shape.edges.len());
        }
    }

    #[test]
    fn graphs_without_cycles_keep_every_edge(shape in arb_graph(1..=40, 3)) {
        // Orient every edge from the lower to the higher index.
        let mut shape = shape;
        for edge in &mut shape.edges {
            *edge = (edge.0.min(edge.1), edge.0.max(edge.1));
        }
        let (g, _) = shape.build();
        prop_assert!(greedy_fas(&g).is_empty());
        prop_assert!(depth_first_fas(&g).is_empty());
    }
}
