use std::ops::Deref;

use crate::{
    geometry::{Circle, Point},
    grid::Grid,
    raster::Chord,
};

/// Fixed nail positions, indexed in angular order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NailSet {
    nails: Vec<Point<isize>>,
}

/// Evenly spaces `count` nails on the circle of `radius` around `center`.
pub fn coordinates(count: usize, center: Point<isize>, radius: isize) -> NailSet {
    let circle = Circle { center, radius };
    NailSet {
        nails: (0..count).map(|idx| circle.point_at(idx, count)).collect(),
    }
}

impl NailSet {
    /// Circle centered on `grid`, `inset` pixels inside its shorter half side.
    pub fn circle(grid: Grid, count: usize, inset: usize) -> Self {
        let half = grid.height.min(grid.width) / 2;
        coordinates(
            count,
            Point::new((grid.width / 2) as isize, (grid.height / 2) as isize),
            half as isize - inset as isize,
        )
    }

    pub fn from_points(nails: Vec<Point<isize>>) -> Self {
        Self { nails }
    }

    /// Chord between nails `a` and `b`. Panics if either index is out of range.
    pub fn chord(&self, a: usize, b: usize) -> Chord {
        Chord::new(self.nails[a], self.nails[b])
    }
}

impl Deref for NailSet {
    type Target = [Point<isize>];

    fn deref(&self) -> &Self::Target {
        &self.nails
    }
}
