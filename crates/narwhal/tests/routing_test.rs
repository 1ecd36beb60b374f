use narwhal::LayeredConfig;
use narwhal::graph::{EdgeId, LGraph, NodeId, Point, PortSide, Size};
use narwhal::routing::{GapReport, route_edges};

/// Two layers of 20x20 nodes at the given y positions.
struct Fixture {
    g: LGraph,
    left: Vec<NodeId>,
    right: Vec<NodeId>,
}

impl Fixture {
    fn new(left_y: &[f64], right_y: &[f64]) -> Self {
        let mut g = LGraph::new();
        let column = |g: &mut LGraph, prefix: &str, ys: &[f64]| {
            let layer = g.add_layer();
            ys.iter()
                .enumerate()
                .map(|(i, &y)| {
                    let n = g.add_node(format!("{prefix}{i}"), Size::new(20.0, 20.0));
                    g.node_mut(n).position.y = y;
                    g.assign_layer(n, layer);
                    n
                })
                .collect::<Vec<_>>()
        };
        let left = column(&mut g, "a", left_y);
        let right = column(&mut g, "b", right_y);
        Self { g, left, right }
    }

    /// Edge between the vertical centres of two nodes.
    fn edge(&mut self, from: usize, to: usize) -> EdgeId {
        let (s, t) = (self.left[from], self.right[to]);
        let sp = self.g.add_fixed_port(s, PortSide::East, Point::new(20.0, 10.0));
        let tp = self.g.add_fixed_port(t, PortSide::West, Point::new(0.0, 10.0));
        self.g.add_edge(sp, tp)
    }
}

#[test]
fn straight_edges_need_no_slot() {
    let mut f = Fixture::new(&[0.0], &[0.0]);
    let e = f.edge(0, 0);
    let report = route_edges(&mut f.g, &LayeredConfig::default()).unwrap();

    assert_eq!(report.gaps, vec![GapReport { slots: 0, crossings: 0 }]);
    assert!(f.g.edge(e).bend_points.is_empty());
    let spacing = LayeredConfig::default().spacing;
    assert_eq!(f.g.node(f.right[0]).position.x, 20.0 + spacing.node_node_between_layers);
}

#[test]
fn disjoint_spans_share_a_slot() {
    let mut f = Fixture::new(&[0.0, 100.0], &[40.0, 140.0]);
    let upper = f.edge(0, 0);
    let lower = f.edge(1, 1);
    let report = route_edges(&mut f.g, &LayeredConfig::default()).unwrap();

    assert_eq!(report.gaps[0].slots, 1);
    let x = |e: EdgeId| f.g.edge(e).bend_points[0].x;
    assert_eq!(x(upper), x(lower));
}

#[test]
fn overlapping_spans_get_distinct_slots_without_crossings() {
    // Both edges run downwards; the lower one must take the left slot.
    let mut f = Fixture::new(&[0.0, 40.0], &[60.0, 100.0]);
    let upper = f.edge(0, 0);
    let lower = f.edge(1, 1);
    let report = route_edges(&mut f.g, &LayeredConfig::default()).unwrap();

    assert_eq!(report.gaps[0], GapReport { slots: 2, crossings: 0 });
    let spacing = LayeredConfig::default().spacing;
    let start = 20.0 + spacing.edge_node_between_layers;
    assert_eq!(
        f.g.edge(lower).bend_points,
        vec![Point::new(start, 50.0), Point::new(start, 110.0)]
    );
    let second = start + spacing.edge_edge_between_layers;
    assert_eq!(
        f.g.edge(upper).bend_points,
        vec![Point::new(second, 10.0), Point::new(second, 70.0)]
    );

    let width = 2.0 * spacing.edge_node_between_layers + spacing.edge_edge_between_layers;
    assert_eq!(f.g.node(f.right[0]).position.x, 20.0 + width);
    assert_eq!(f.g.size.width, 20.0 + width + 20.0);
}

#[test]
fn crossing_edges_take_distinct_slots() {
    // a0 -> b1 and a1 -> b0 cost the same in either order; the tie is broken by creation order.
    let mut f = Fixture::new(&[0.0, 40.0], &[0.0, 40.0]);
    let down = f.edge(0, 1);
    let up = f.edge(1, 0);
    let report = route_edges(&mut f.g, &LayeredConfig::default()).unwrap();

    assert_eq!(report.gaps[0].slots, 2);
    let x = |e: EdgeId| f.g.edge(e).bend_points[0].x;
    assert!(x(down) > x(up));
}

#[test]
fn shared_source_port_gets_a_junction() {
    let mut f = Fixture::new(&[0.0], &[0.0, 60.0]);
    let port = f
        .g
        .add_fixed_port(f.left[0], PortSide::East, Point::new(20.0, 10.0));
    let to = |g: &mut LGraph, n: NodeId| {
        let tp = g.add_fixed_port(n, PortSide::West, Point::new(0.0, 10.0));
        g.add_edge(port, tp)
    };
    let straight = to(&mut f.g, f.right[0]);
    let bent = to(&mut f.g, f.right[1]);
    let report = route_edges(&mut f.g, &LayeredConfig::default()).unwrap();

    assert_eq!(report.gaps[0].slots, 1);
    assert!(f.g.edge(straight).bend_points.is_empty());
    let x = f.g.edge(bent).bend_points[0].x;
    assert_eq!(f.g.edge(bent).bend_points, vec![Point::new(x, 10.0), Point::new(x, 70.0)]);
    assert_eq!(f.g.edge(bent).junction_points, vec![Point::new(x, 10.0)]);
}

#[test]
fn layers_are_centred_in_their_column() {
    let mut g = LGraph::new();
    let layer = g.add_layer();
    let wide = g.add_node("wide", Size::new(40.0, 20.0));
    let narrow = g.add_node("narrow", Size::new(10.0, 20.0));
    g.node_mut(narrow).position.y = 40.0;
    g.assign_layer(wide, layer);
    g.assign_layer(narrow, layer);

    let report = route_edges(&mut g, &LayeredConfig::default()).unwrap();
    assert!(report.gaps.is_empty());
    assert_eq!(g.node(wide).position.x, 0.0);
    assert_eq!(g.node(narrow).position.x, 15.0);
    assert_eq!(g.layers()[0].width, 40.0);
    assert_eq!(g.size.width, 40.0);
    assert_eq!(g.size.height, 60.0);
}

#[test]
fn diagnostics_describe_every_gap() {
    let mut f = Fixture::new(&[0.0, 40.0], &[60.0, 100.0]);
    f.edge(0, 0);
    f.edge(1, 1);
    let config = LayeredConfig {
        diagnostics: true,
        ..Default::default()
    };
    let report = route_edges(&mut f.g, &config).unwrap();
    let dump = report.dump.unwrap();
    let gap = &dump.gaps["l0-l1"];
    assert_eq!(gap.slots, 2);
    assert_eq!(gap.hypernodes.len(), 2);
    assert_eq!(gap.dependencies.len(), 1);
    assert_eq!(gap.dependencies[0].source, 1);
    assert_eq!(gap.dependencies[0].target, 0);
    assert_eq!(gap.dependencies[0].weight, 2);
}
