//! Generic sweep: sort points, then hand each one to every handler in turn.

use std::cmp::Ordering;

pub trait ScanlineHandler<P> {
    fn handle(&mut self, point: &P);
}

impl<P, F> ScanlineHandler<P> for F
where
    F: FnMut(&P),
{
    fn handle(&mut self, point: &P) {
        self(point)
    }
}

/// A one-shot sweep over a point set.
///
/// Points are sorted with a stable sort, so points that compare equal are visited in input
/// order. Handlers see each point in the order they were registered.
pub struct Scanline<'h, P> {
    points: Vec<P>,
    handlers: Vec<&'h mut dyn ScanlineHandler<P>>,
}

impl<'h, P> Scanline<'h, P> {
    pub fn new(points: Vec<P>) -> Self {
        Self {
            points,
            handlers: Vec::new(),
        }
    }

    pub fn handler(mut self, handler: &'h mut dyn ScanlineHandler<P>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn execute(mut self, order: impl FnMut(&P, &P) -> Ordering) -> Vec<P> {
        self.points.sort_by(order);
        for point in &self.points {
            for handler in self.handlers.iter_mut() {
                handler.handle(point);
            }
        }
        self.points
    }
}

/// Shorthand for a sweep with a single handler.
pub fn execute<P>(
    points: Vec<P>,
    order: impl FnMut(&P, &P) -> Ordering,
    handler: &mut dyn ScanlineHandler<P>,
) -> Vec<P> {
    Scanline::new(points).handler(handler).execute(order)
}
