use narwhal_compaction::{
    Axis, CGraph, ConstraintSource, Direction, Error, OneDimensionalCompactor, Rect,
};
use proptest::prelude::*;

const EPSILON: f64 = 1e-4;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {expected}, got {actual}"
    );
}

fn two_boxes(second: Rect) -> CGraph {
    let mut g = CGraph::new();
    g.add_node("first", Rect::new(0.0, 0.0, 20.0, 20.0));
    g.add_node("second", second);
    g
}

#[test]
fn left_compaction_moves_boxes_together() {
    let mut g = two_boxes(Rect::new(30.0, 0.0, 20.0, 20.0));
    OneDimensionalCompactor::new(&mut g)
        .change_direction(Direction::Left)
        .compact()
        .unwrap();

    assert_close(g.nodes()[0].hitbox.x, 0.0);
    assert_close(g.nodes()[1].hitbox.x, 20.0);
}

#[test]
fn left_compaction_ignores_boxes_that_only_touch_vertically() {
    let mut g = two_boxes(Rect::new(30.0, 20.0, 20.0, 20.0));
    OneDimensionalCompactor::new(&mut g).compact().unwrap();

    assert_close(g.nodes()[0].hitbox.x, 0.0);
    assert_close(g.nodes()[1].hitbox.x, 0.0);
}

#[test]
fn left_compaction_respects_spacing_overlap() {
    let mut g = two_boxes(Rect::new(30.0, 24.0, 20.0, 20.0));
    OneDimensionalCompactor::new(&mut g)
        .with_spacing(5.0)
        .compact()
        .unwrap();

    assert_close(g.nodes()[0].hitbox.x, 0.0);
    assert_close(g.nodes()[1].hitbox.x, 25.0);
}

#[test]
fn left_compaction_spacing_does_not_reach_distant_boxes() {
    let mut g = two_boxes(Rect::new(30.0, 26.0, 20.0, 20.0));
    OneDimensionalCompactor::new(&mut g)
        .with_spacing(5.0)
        .compact()
        .unwrap();

    assert_close(g.nodes()[0].hitbox.x, 0.0);
    assert_close(g.nodes()[1].hitbox.x, 0.0);
}

#[test]
fn right_compaction_moves_towards_the_rightmost_box() {
    let mut g = two_boxes(Rect::new(30.0, 0.0, 20.0, 20.0));
    OneDimensionalCompactor::new(&mut g)
        .change_direction(Direction::Right)
        .compact()
        .unwrap();

    assert_close(g.nodes()[0].hitbox.x, 10.0);
    assert_close(g.nodes()[1].hitbox.x, 30.0);
}

#[test]
fn up_and_down_compaction_work_on_the_vertical_axis() {
    let mut g = two_boxes(Rect::new(0.0, 30.0, 20.0, 20.0));
    let mut compactor = OneDimensionalCompactor::new(&mut g);
    compactor.change_direction(Direction::Up).compact().unwrap();
    drop(compactor);
    assert_close(g.nodes()[0].hitbox.y, 0.0);
    assert_close(g.nodes()[1].hitbox.y, 20.0);
    assert_close(g.nodes()[1].hitbox.x, 0.0);

    let mut g = two_boxes(Rect::new(0.0, 30.0, 20.0, 20.0));
    OneDimensionalCompactor::new(&mut g)
        .change_direction(Direction::Down)
        .compact()
        .unwrap();
    assert_close(g.nodes()[0].hitbox.y, 10.0);
    assert_close(g.nodes()[1].hitbox.y, 30.0);
}

#[test]
fn predefined_chain_is_placed_at_minimal_gaps() {
    let mut g = CGraph::new();
    let a = g.add_node("a", Rect::new(0.0, 0.0, 0.0, 10.0));
    let b = g.add_node("b", Rect::new(55.0, 0.0, 0.0, 10.0));
    let c = g.add_node("c", Rect::new(300.0, 0.0, 0.0, 10.0));
    g.add_constraint(Axis::Horizontal, a, b, 10.0);
    g.add_constraint(Axis::Horizontal, b, c, 10.0);

    OneDimensionalCompactor::new(&mut g)
        .with_constraint_source(ConstraintSource::Predefined)
        .compact()
        .unwrap();

    let xa = g.node(a).hitbox.x;
    assert_close(g.node(b).hitbox.x, xa + 10.0);
    assert_close(g.node(c).hitbox.x, g.node(b).hitbox.x + 10.0);
}

#[test]
fn locked_node_keeps_its_coordinate() {
    let mut g = CGraph::new();
    let a = g.add_node("a", Rect::new(0.0, 0.0, 0.0, 10.0));
    let b = g.add_node("b", Rect::new(3.0, 0.0, 0.0, 10.0));
    let c = g.add_node("c", Rect::new(300.0, 0.0, 0.0, 10.0));
    g.add_constraint(Axis::Horizontal, a, b, 10.0);
    g.add_constraint(Axis::Horizontal, b, c, 10.0);

    OneDimensionalCompactor::new(&mut g)
        .with_constraint_source(ConstraintSource::Predefined)
        .with_lock(|n, _| n.name == "b")
        .compact()
        .unwrap();

    assert_close(g.node(a).hitbox.x, 0.0);
    assert_close(g.node(b).hitbox.x, 3.0);
    assert_close(g.node(c).hitbox.x, 13.0);
}

#[test]
fn right_compaction_honors_predefined_constraints() {
    let mut g = CGraph::new();
    let a = g.add_node("a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = g.add_node("b", Rect::new(100.0, 0.0, 10.0, 10.0));
    g.add_constraint(Axis::Horizontal, a, b, 5.0);

    OneDimensionalCompactor::new(&mut g)
        .with_constraint_source(ConstraintSource::Predefined)
        .change_direction(Direction::Right)
        .compact()
        .unwrap();

    assert_close(g.node(b).hitbox.x, 100.0);
    assert_close(g.node(a).hitbox.x, 85.0);
}

#[test]
fn cyclic_constraints_are_a_precondition_violation() {
    let mut g = CGraph::new();
    let a = g.add_node("a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = g.add_node("b", Rect::new(20.0, 0.0, 10.0, 10.0));
    let c = g.add_node("c", Rect::new(40.0, 0.0, 10.0, 10.0));
    g.add_constraint(Axis::Horizontal, a, b, 0.0);
    g.add_constraint(Axis::Horizontal, b, c, 0.0);
    g.add_constraint(Axis::Horizontal, c, b, 0.0);

    let err = OneDimensionalCompactor::new(&mut g)
        .with_constraint_source(ConstraintSource::Predefined)
        .compact()
        .map(|_| ())
        .unwrap_err();

    match err {
        Error::PreconditionViolation { element, .. } => {
            assert!(element.contains("b") || element.contains("c"), "{element}");
            assert!(!element.contains("(a)"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    // Hitboxes are untouched by a failed run.
    assert_close(g.node(b).hitbox.x, 20.0);
}

#[test]
fn predefined_constraints_on_the_other_axis_are_unsupported() {
    let mut g = CGraph::new();
    let a = g.add_node("a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = g.add_node("b", Rect::new(20.0, 0.0, 10.0, 10.0));
    g.add_constraint(Axis::Horizontal, a, b, 0.0);

    let result = OneDimensionalCompactor::new(&mut g)
        .with_constraint_source(ConstraintSource::Predefined)
        .change_direction(Direction::Up)
        .compact()
        .map(|_| ());

    assert!(matches!(
        result,
        Err(Error::UnsupportedConfiguration { .. })
    ));
}

#[test]
fn dump_serializes_nodes_and_constraints() {
    let mut g = CGraph::new();
    let a = g.add_node("a", Rect::new(0.0, 0.0, 10.0, 10.0));
    let b = g.add_node("b", Rect::new(20.0, 0.0, 10.0, 10.0));
    g.add_constraint(Axis::Horizontal, a, b, 4.0);

    let json = serde_json::to_value(g.dump()).unwrap();
    assert_eq!(json["nodes"][1]["name"], "b");
    assert_eq!(json["constraints"][0]["gap"], 4.0);
    assert_eq!(json["constraints"][0]["axis"], "Horizontal");
}

/// Boxes with integer coordinates; overlapping input is allowed.
fn arb_boxes() -> impl Strategy<Value = Vec<Rect>> {
    let rect = (0u32..200, 0u32..200, 0u32..40, 1u32..40).prop_map(|(x, y, w, h)| {
        Rect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h))
    });
    prop::collection::vec(rect, 1..=30)
}

/// Whether two vertical extents, each widened by half the spacing, overlap.
fn conflicting(a: &Rect, b: &Rect, spacing: f64) -> bool {
    let half = spacing / 2.0;
    a.y - half < b.y + b.height + half && b.y - half < a.y + a.height + half
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn horizontal_compaction_separates_conflicting_boxes(
        boxes in arb_boxes(),
        spacing in prop::sample::select(vec![0.0, 5.0, 12.0]),
        direction in prop::sample::select(vec![Direction::Left, Direction::Right]),
    ) {
        let mut g = CGraph::new();
        for (i, r) in boxes.iter().enumerate() {
            g.add_node(format!("b{i}"), *r);
        }
        OneDimensionalCompactor::new(&mut g)
            .with_spacing(spacing)
            .change_direction(direction)
            .compact()
            .unwrap();

        let placed: Vec<Rect> = g.nodes().iter().map(|n| n.hitbox).collect();
        for i in 0..placed.len() {
            let (a, orig) = (&placed[i], &boxes[i]);
            // Only the compaction axis moves.
            prop_assert_eq!(a.y, orig.y);
            prop_assert_eq!(a.width, orig.width);
            for b in &placed[i + 1..] {
                if !conflicting(a, b, spacing) {
                    continue;
                }
                let apart = a.x + a.width + spacing <= b.x + EPSILON
                    || b.x + b.width + spacing <= a.x + EPSILON;
                prop_assert!(apart, "{:?} and {:?} are closer than {}", a, b, spacing);
            }
        }
    }

    #[test]
    fn left_compaction_never_leaves_a_box_unsupported(boxes in arb_boxes()) {
        let mut g = CGraph::new();
        for (i, r) in boxes.iter().enumerate() {
            g.add_node(format!("b{i}"), *r);
        }
        OneDimensionalCompactor::new(&mut g).compact().unwrap();

        // Every box either sits at the leftmost start or touches a conflicting box on its left.
        let placed: Vec<Rect> = g.nodes().iter().map(|n| n.hitbox).collect();
        let start = boxes.iter().map(|r| r.x).fold(f64::INFINITY, f64::min);
        for (i, a) in placed.iter().enumerate() {
            let supported = (a.x - start).abs() < EPSILON
                || placed.iter().enumerate().any(|(j, b)| {
                    j != i && conflicting(a, b, 0.0) && (b.x + b.width - a.x).abs() < EPSILON
                });
            prop_assert!(supported, "{:?} floats at {}", a, a.x);
        }
    }
}
