use narwhal_graph::{EdgeId, Error, LGraph, NodeMap, Point, PortId, PortSide, Size};

fn sized() -> Size {
    Size::new(30.0, 20.0)
}

#[test]
fn connect_creates_east_and_west_ports() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let e = g.connect(a, b);

    let sp = g.edge(e).source();
    let tp = g.edge(e).target();
    assert_eq!(g.port(sp).side, PortSide::East);
    assert_eq!(g.port(tp).side, PortSide::West);
    assert_eq!(g.source_node(e), a);
    assert_eq!(g.target_node(e), b);
    assert_eq!(g.outgoing_edges(a), vec![e]);
    assert_eq!(g.incoming_edges(b), vec![e]);
    assert!(g.incoming_edges(a).is_empty());
}

#[test]
fn reverse_edge_flips_exclusive_free_ports() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let e = g.connect(a, b);
    let sp = g.edge(e).source();

    g.reverse_edge(e, true);

    assert!(g.edge(e).reversed);
    assert_eq!(g.source_node(e), b);
    assert_eq!(g.target_node(e), a);
    assert_eq!(g.edge(e).target(), sp);
    assert_eq!(g.port(sp).side, PortSide::West);
    assert_eq!(g.port(g.edge(e).source()).side, PortSide::East);

    g.reverse_edge(e, false);
    assert!(!g.edge(e).reversed);
    assert_eq!(g.source_node(e), a);
}

#[test]
fn reverse_edge_creates_new_port_for_shared_ports() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let c = g.add_node("c", sized());
    let shared = g.add_port(a, PortSide::East);
    let pb = g.add_port(b, PortSide::West);
    let pc = g.add_port(c, PortSide::West);
    let e1 = g.add_edge(shared, pb);
    let e2 = g.add_edge(shared, pc);

    g.reverse_edge(e1, true);

    assert_eq!(g.port(shared).side, PortSide::East);
    assert_eq!(g.port(shared).outgoing(), &[e2]);
    let new_target = g.edge(e1).target();
    assert_ne!(new_target, shared);
    assert_eq!(g.port(new_target).side, PortSide::West);
    assert_eq!(g.port(new_target).node, a);
}

#[test]
fn hidden_edges_are_skipped_until_restored() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let e = g.connect(a, b);

    g.hide_edge(e);
    assert_eq!(g.edge_count(), 0);
    assert!(g.outgoing_edges(a).is_empty());

    g.restore_edge(e);
    assert_eq!(g.edge_ids().collect::<Vec<EdgeId>>(), vec![e]);
    assert_eq!(g.outgoing_edges(a), vec![e]);
}

#[test]
fn layers_keep_insertion_and_explicit_order() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let c = g.add_node("c", sized());
    let l0 = g.add_layer();
    let l1 = g.add_layer();
    g.assign_layer(a, l0);
    g.assign_layer(b, l0);
    g.assign_layer(c, l1);
    assert_eq!(g.layer(l0).nodes(), &[a, b]);
    assert_eq!(g.layer_index(c), Some(1));

    g.set_layer_order(l0, vec![b, a]);
    assert_eq!(g.layer(l0).nodes(), &[b, a]);

    g.assign_layer(b, l1);
    assert_eq!(g.layer(l0).nodes(), &[a]);
    assert_eq!(g.layer(l1).nodes(), &[c, b]);

    g.remove_node(c);
    assert_eq!(g.layer(l1).nodes(), &[b]);
    assert_eq!(g.node_count(), 2);
}

#[test]
fn port_absolute_anchor_adds_node_and_port_offsets() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let p = g.add_fixed_port(a, PortSide::East, Point::new(30.0, 5.0));
    g.port_mut(p).anchor = Point::new(0.0, 2.0);
    g.node_mut(a).position = Point::new(100.0, 40.0);

    assert_eq!(g.port_absolute_anchor(p), Point::new(130.0, 47.0));
}

#[test]
fn validate_reports_the_offending_edge() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let pa = g.add_port(a, PortSide::East);
    let e = g.add_edge(pa, PortId::from_index(42));

    match g.validate() {
        Err(Error::DanglingEdge { edge, port }) => {
            assert_eq!(edge, e);
            assert_eq!(port, PortId::from_index(42));
        }
        other => panic!("unexpected validation result: {other:?}"),
    }
}

#[test]
fn validate_rejects_negative_sizes() {
    let mut g = LGraph::new();
    let a = g.add_node("a", Size::new(-1.0, 10.0));
    let err = g.validate().unwrap_err();
    assert_eq!(err.element(), a.to_string());
}

#[test]
fn validate_checks_edge_weight_and_delta() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let e = g.connect(a, b);
    let lp = g.connect(b, b);
    assert!(g.validate().is_ok());

    g.edge_mut(e).delta = 0;
    assert!(matches!(g.validate(), Err(Error::InvalidDelta { edge, delta: 0 }) if edge == e));

    g.edge_mut(e).delta = 2;
    g.edge_mut(e).weight = f64::NAN;
    assert!(matches!(g.validate(), Err(Error::InvalidWeight { edge, .. }) if edge == e));

    // Self-loops never reach layering, so their weight and delta are not checked.
    g.edge_mut(e).weight = 1.0;
    g.edge_mut(lp).delta = 0;
    g.edge_mut(lp).weight = -3.0;
    assert!(g.validate().is_ok());
}

#[test]
fn node_map_is_indexed_by_handle() {
    let mut g = LGraph::new();
    let a = g.add_node("a", sized());
    let b = g.add_node("b", sized());
    let mut marks: NodeMap<u32> = NodeMap::new(&g, 0);
    marks[b] = 7;
    assert_eq!(marks[a], 0);
    assert_eq!(marks[b], 7);
    assert_eq!(g.node_by_name("b"), Some(b));
}
