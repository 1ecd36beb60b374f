//! Overlap constraints derived by a vertical sweep.
//!
//! Operates on hitboxes already transformed so that compaction goes to the left. Two boxes are
//! constrained when their vertical extents, widened by half the spacing on both sides, overlap.
//! Only pairs that are neighbours in the active set when one of them closes are constrained;
//! every other overlapping pair is ordered transitively through the boxes between them.

use crate::cgraph::Rect;
use crate::scanline::{self, ScanlineHandler};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Timestamp {
    node: usize,
    pos: f64,
    low: bool,
}

struct ConstraintsHandler<'a> {
    boxes: &'a [Rect],
    /// Active boxes sorted by horizontal center.
    active: Vec<usize>,
    out: Vec<(usize, usize)>,
}

impl ConstraintsHandler<'_> {
    fn cmp_center(&self, a: usize, b: usize) -> Ordering {
        self.boxes[a]
            .center_x()
            .total_cmp(&self.boxes[b].center_x())
            .then(a.cmp(&b))
    }

    fn position(&self, node: usize) -> std::result::Result<usize, usize> {
        self.active.binary_search_by(|&other| self.cmp_center(other, node))
    }
}

impl ScanlineHandler<Timestamp> for ConstraintsHandler<'_> {
    fn handle(&mut self, p: &Timestamp) {
        if p.low {
            let ix = match self.position(p.node) {
                Ok(ix) | Err(ix) => ix,
            };
            self.active.insert(ix, p.node);
        } else {
            let Ok(ix) = self.position(p.node) else {
                return;
            };
            if let Some(left) = ix.checked_sub(1).map(|l| self.active[l]) {
                self.out.push((left, p.node));
            }
            if let Some(&right) = self.active.get(ix + 1) {
                self.out.push((p.node, right));
            }
            self.active.remove(ix);
        }
    }
}

/// Returns `(left, right)` index pairs: `right` must be placed after `left` ends.
pub fn calculate(boxes: &[Rect], spacing: f64) -> Vec<(usize, usize)> {
    let half = spacing / 2.0;
    let mut points: Vec<Timestamp> = Vec::with_capacity(boxes.len() * 2);
    for (node, r) in boxes.iter().enumerate() {
        let (low, high) = (r.y - half, r.y + r.height + half);
        // An empty extent cannot overlap anything.
        if high <= low {
            continue;
        }
        points.push(Timestamp {
            node,
            pos: low,
            low: true,
        });
        points.push(Timestamp {
            node,
            pos: high,
            low: false,
        });
    }

    let mut handler = ConstraintsHandler {
        boxes,
        active: Vec::with_capacity(boxes.len()),
        out: Vec::new(),
    };
    // Closing before opening at equal positions keeps touching boxes unconstrained.
    scanline::execute(
        points,
        |a, b| {
            a.pos
                .total_cmp(&b.pos)
                .then(a.low.cmp(&b.low))
                .then(a.node.cmp(&b.node))
        },
        &mut handler,
    );

    let mut out = handler.out;
    out.sort_unstable();
    out.dedup();
    out
}
