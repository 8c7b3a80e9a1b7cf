use std::iter::FusedIterator;

use crate::geometry::Point;

/// Straight segment between two nail positions, stored with its endpoints in
/// canonical order so that `Chord::new(a, b)` and `Chord::new(b, a)` are equal
/// and rasterize to the exact same cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Chord {
    start: Point<isize>,
    end: Point<isize>,
}

impl Chord {
    pub fn new(a: Point<isize>, b: Point<isize>) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Cells crossed by the chord, both endpoints included. No bounds checking
    /// is done here; every call returns a fresh iterator.
    pub fn pixels(&self) -> Pixels {
        Pixels::new(self.start, self.end)
    }
}

/// Integer Bresenham walk from one endpoint to the other.
#[derive(Clone, Debug)]
pub struct Pixels {
    current: Point<isize>,
    step: Point<isize>,
    delta: Point<isize>,
    err: isize,
    remaining: usize,
}

impl Pixels {
    fn new(start: Point<isize>, end: Point<isize>) -> Self {
        let delta = Point {
            x: (end.x - start.x).abs(),
            y: (end.y - start.y).abs(),
        };
        Self {
            current: start,
            step: Point {
                x: if start.x < end.x { 1 } else { -1 },
                y: if start.y < end.y { 1 } else { -1 },
            },
            err: delta.x - delta.y,
            remaining: delta.x.max(delta.y) as usize + 1,
            delta,
        }
    }
}

impl Iterator for Pixels {
    type Item = Point<isize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let point = self.current;
        let e2 = 2 * self.err;
        if e2 > -self.delta.y {
            self.err -= self.delta.y;
            self.current.x += self.step.x;
        }
        if e2 < self.delta.x {
            self.err += self.delta.x;
            self.current.y += self.step.y;
        }
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Pixels {}

impl FusedIterator for Pixels {}
