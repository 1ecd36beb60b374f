use narwhal_compaction::scanline::{self, Scanline};
use narwhal_compaction::scanline_constraints;
use narwhal_compaction::Rect;

#[test]
fn scanline_visits_points_in_caller_order() {
    let mut seen: Vec<i32> = Vec::new();
    let mut record = |p: &i32| seen.push(*p);
    let sorted = scanline::execute(vec![5, 1, 4, 2], |a, b| a.cmp(b), &mut record);

    assert_eq!(sorted, vec![1, 2, 4, 5]);
    assert_eq!(seen, vec![1, 2, 4, 5]);
}

#[test]
fn scanline_dispatches_each_point_to_every_handler_in_order() {
    let mut log: Vec<String> = Vec::new();
    {
        let log = std::cell::RefCell::new(&mut log);
        let mut first = |p: &(u8, char)| log.borrow_mut().push(format!("first:{}", p.1));
        let mut second = |p: &(u8, char)| log.borrow_mut().push(format!("second:{}", p.1));
        Scanline::new(vec![(2, 'b'), (1, 'a'), (2, 'c')])
            .handler(&mut first)
            .handler(&mut second)
            .execute(|x, y| x.0.cmp(&y.0));
    }

    assert_eq!(
        log,
        vec![
            "first:a", "second:a", "first:b", "second:b", "first:c", "second:c"
        ]
    );
}

#[test]
fn overlapping_row_yields_a_chain_of_neighbour_constraints() {
    let boxes = vec![
        Rect::new(100.0, 0.0, 10.0, 10.0),
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(50.0, 0.0, 10.0, 10.0),
    ];
    let constraints = scanline_constraints::calculate(&boxes, 0.0);

    assert!(constraints.contains(&(1, 2)));
    assert!(constraints.contains(&(2, 0)));
    assert!(!constraints.contains(&(0, 1)));
    assert!(!constraints.contains(&(2, 1)));
}

#[test]
fn stacked_boxes_without_vertical_overlap_are_unconstrained() {
    let boxes = vec![
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(50.0, 10.0, 10.0, 10.0),
        Rect::new(100.0, 30.0, 10.0, 10.0),
    ];
    assert!(scanline_constraints::calculate(&boxes, 0.0).is_empty());
}

#[test]
fn staircase_constrains_only_overlapping_pairs() {
    // 0 overlaps 1, 1 overlaps 2, 0 and 2 are disjoint.
    let boxes = vec![
        Rect::new(0.0, 0.0, 10.0, 10.0),
        Rect::new(20.0, 5.0, 10.0, 10.0),
        Rect::new(40.0, 12.0, 10.0, 10.0),
    ];
    let constraints = scanline_constraints::calculate(&boxes, 0.0);

    assert!(constraints.contains(&(0, 1)));
    assert!(constraints.contains(&(1, 2)));
    assert!(!constraints.contains(&(0, 2)));
}
