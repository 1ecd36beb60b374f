use narwhal::graph::{EdgeId, LGraph, NodeId, Point, PortSide, Size};
use narwhal::{LayeredConfig, NullMonitor, layout, self_loops};

fn node(g: &mut LGraph, name: &str) -> NodeId {
    g.add_node(name, Size::new(30.0, 20.0))
}

fn outside_of(g: &LGraph, n: NodeId, p: Point) -> bool {
    let node = g.node(n);
    p.x < node.position.x
        || p.x > node.position.x + node.size.width
        || p.y < node.position.y
        || p.y > node.position.y + node.size.height
}

#[test]
fn free_loop_ports_move_to_east_and_north() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let e = g.connect(a, a);

    let loops = self_loops::prepare(&mut g).unwrap();
    assert_eq!(loops.len(), 1);
    assert!(g.edge(e).is_hidden());
    assert_eq!(g.edge_ids().count(), 0);

    let sl = &loops.loops[0];
    assert_eq!((sl.source_side, sl.target_side), (PortSide::East, PortSide::North));
    assert!(!sl.clockwise);
    assert_eq!(sl.sides(), vec![PortSide::East, PortSide::North]);
}

#[test]
fn fixed_ports_decide_the_direction() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let east = g.add_fixed_port(a, PortSide::East, Point::new(30.0, 10.0));
    let south = g.add_fixed_port(a, PortSide::South, Point::new(15.0, 20.0));
    let west = g.add_fixed_port(a, PortSide::West, Point::new(0.0, 10.0));
    g.add_edge(east, south);
    g.add_edge(east, west);

    let loops = self_loops::prepare(&mut g).unwrap();
    let clockwise = &loops.loops[0];
    assert!(clockwise.clockwise);
    assert_eq!(clockwise.sides(), vec![PortSide::East, PortSide::South]);
    let around = &loops.loops[1];
    assert!(!around.clockwise);
    assert_eq!(
        around.sides(),
        vec![PortSide::East, PortSide::North, PortSide::West]
    );
}

#[test]
fn shorter_loops_sit_closer_to_the_node() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let east = g.add_fixed_port(a, PortSide::East, Point::new(30.0, 10.0));
    let north = g.add_fixed_port(a, PortSide::North, Point::new(15.0, 0.0));
    let west = g.add_fixed_port(a, PortSide::West, Point::new(0.0, 10.0));
    let long = g.add_edge(east, west);
    let short = g.add_edge(east, north);
    let config = LayeredConfig::default();

    let mut loops = self_loops::prepare(&mut g).unwrap();
    self_loops::route(&mut g, &mut loops, &config).unwrap();

    let level = |e: EdgeId| loops.loops.iter().find(|l| l.edge == e).map(|l| l.level);
    assert_eq!(level(short), Some(0));
    assert_eq!(level(long), Some(1));

    let s = config.spacing;
    let margin = g.node(a).margin;
    assert_eq!(margin.top, s.node_self_loop + s.edge_edge);
    assert_eq!(margin.right, s.node_self_loop + s.edge_edge);
    assert_eq!(margin.left, s.node_self_loop + s.edge_edge);
    assert_eq!(margin.bottom, 0.0);
}

#[test]
fn restore_writes_absolute_bend_points_around_the_node() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let e = g.connect(a, a);
    let config = LayeredConfig::default();

    let mut loops = self_loops::prepare(&mut g).unwrap();
    self_loops::route(&mut g, &mut loops, &config).unwrap();
    g.node_mut(a).position = Point::new(100.0, 50.0);
    assert_eq!(self_loops::restore(&mut g, loops).unwrap(), 1);

    let edge = g.edge(e);
    assert!(edge.is_active());
    let offset = config.spacing.node_self_loop;
    assert_eq!(edge.bend_points.len(), 3);
    assert_eq!(edge.bend_points[1], Point::new(100.0 + 30.0 + offset, 50.0 - offset));
    for &p in &edge.bend_points {
        assert!(outside_of(&g, a, p), "{p:?}");
    }
}

#[test]
fn loops_do_not_take_part_in_layering_or_ordering() {
    let build = |with_loops: bool| {
        let mut g = LGraph::new();
        let a = node(&mut g, "a");
        let b = node(&mut g, "b");
        let c = node(&mut g, "c");
        g.connect(a, b);
        g.connect(a, c);
        if with_loops {
            g.connect(b, b);
            g.connect(c, c);
            g.connect(c, c);
        }
        (g, [a, b, c])
    };

    let (mut plain, ids) = build(false);
    let (mut looped, _) = build(true);
    let config = LayeredConfig::default();
    let plain_report = layout(&mut plain, &config, &mut NullMonitor).unwrap();
    let looped_report = layout(&mut looped, &config, &mut NullMonitor).unwrap();

    assert_eq!(looped_report.self_loops, 3);
    assert_eq!(plain_report.layer_count, looped_report.layer_count);
    assert_eq!(looped_report.reversed_edges, 0);
    for n in ids {
        assert_eq!(plain.layer_index(n), looped.layer_index(n));
    }
    let order = |g: &LGraph| {
        g.layers()
            .iter()
            .map(|l| l.nodes().to_vec())
            .collect::<Vec<_>>()
    };
    assert_eq!(order(&plain), order(&looped));

    for e in looped.edge_ids().filter(|&e| looped.is_self_loop(e)) {
        let n = looped.source_node(e);
        let bends = &looped.edge(e).bend_points;
        assert!(!bends.is_empty());
        for &p in bends {
            assert!(outside_of(&looped, n, p), "{p:?}");
        }
    }
}

#[test]
fn placement_keeps_room_for_the_loop() {
    let mut g = LGraph::new();
    let a = node(&mut g, "a");
    let b = node(&mut g, "b");
    let c = node(&mut g, "c");
    g.connect(a, b);
    g.connect(a, c);
    g.connect(c, c);

    layout(&mut g, &LayeredConfig::default(), &mut NullMonitor).unwrap();
    assert_eq!(g.layers()[1].nodes(), &[b, c]);

    // The loop on c runs along its north side, towards b.
    let loop_edge = g
        .edge_ids()
        .find(|&e| g.is_self_loop(e))
        .expect("loop restored");
    let b_bottom = g.node(b).position.y + g.node(b).size.height;
    for p in &g.edge(loop_edge).bend_points {
        assert!(p.y > b_bottom, "{p:?} runs into b");
    }
}
