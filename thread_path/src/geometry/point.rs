use num_traits::AsPrimitive;

use crate::Float;

/// A 2D position. On the canvas `x` is the column and `y` is the row.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

impl<T> Point<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Float> Point<T> {
    pub fn sq_distance(&self, other: &Self) -> T {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> T {
        num_traits::Float::sqrt(self.sq_distance(other))
    }
}

impl<S> Point<S> {
    pub fn as_<I: Copy + 'static>(self) -> Point<I>
    where
        S: AsPrimitive<I>,
    {
        Point {
            x: self.x.as_(),
            y: self.y.as_(),
        }
    }
}

impl<T: std::fmt::Display> std::fmt::Display for Point<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:2}, {:2})", self.x, self.y)
    }
}
