use serde::{Deserialize, Serialize};

use crate::{geometry::Point, raster::Chord};

/// Dimensions of a row-major pixel grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid<T = usize> {
    pub height: T,
    pub width: T,
}

impl<T> Grid<T> {
    pub fn new(height: T, width: T) -> Self {
        Self { height, width }
    }
}

impl Grid {
    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat index of `point`, or `None` if it falls outside the grid.
    pub fn index_of(&self, point: Point<isize>) -> Option<usize> {
        let x = usize::try_from(point.x).ok()?;
        let y = usize::try_from(point.y).ok()?;
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    pub fn point_of(&self, index: usize) -> Point<usize> {
        Point {
            x: index % self.width,
            y: index / self.width,
        }
    }

    /// In-bounds flat indexes of the cells crossed by `chord`, in rasterization order.
    pub fn indexes_in(&self, chord: Chord) -> impl Iterator<Item = usize> + '_ {
        chord.pixels().filter_map(|point| self.index_of(point))
    }
}
