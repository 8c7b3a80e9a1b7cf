use std::f64::consts::TAU;

use super::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Circle<T> {
    pub center: Point<T>,
    pub radius: T,
}

impl Circle<isize> {
    /// Position of the `idx`-th of `count` points evenly spaced counter-clockwise
    /// (in image coordinates) from angle zero, truncated toward zero.
    ///
    /// The trigonometry always runs in `f64` so the layout is independent of the
    /// precision chosen for the residual field.
    pub fn point_at(&self, idx: usize, count: usize) -> Point<isize> {
        let theta = TAU * idx as f64 / count as f64;
        let radius = self.radius as f64;
        Point {
            x: (self.center.x as f64 + radius * theta.cos()) as isize,
            y: (self.center.y as f64 + radius * theta.sin()) as isize,
        }
    }
}
