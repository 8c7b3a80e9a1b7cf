use std::ops::{Deref, Index};

use image::{GrayImage, Luma};

use crate::{
    error::{Error, Result},
    geometry::Point,
    Grid,
};

mod preprocess;

pub use preprocess::{load, preprocess};

/// Row-major pixel buffer tied to its grid dimensions.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelData<T> {
    pixels: Vec<T>,
    grid: Grid,
}

/// Target image as the core sees it: one gray level in [0, 255] per cell.
pub type IntensityField = PixelData<u8>;

impl<T> PixelData<T> {
    pub fn from_raw(pixels: Vec<T>, grid: Grid) -> Result<Self> {
        if pixels.len() != grid.len() {
            return Err(Error::FieldSize {
                grid,
                expected: grid.len(),
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels, grid })
    }

    pub fn new(mut builder: impl FnMut(Point<usize>) -> T, grid: Grid) -> Self {
        let pixels = (0..grid.len())
            .map(|index| builder(grid.point_of(index)))
            .collect();
        Self { pixels, grid }
    }

    pub fn filled(value: T, grid: Grid) -> Self
    where
        T: Clone,
    {
        Self {
            pixels: vec![value; grid.len()],
            grid,
        }
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [T] {
        &mut self.pixels
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn get(&self, point: Point<usize>) -> Option<&T> {
        (point.x < self.grid.width && point.y < self.grid.height)
            .then(|| &self.pixels[point.y * self.grid.width + point.x])
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> PixelData<U> {
        PixelData {
            pixels: self.pixels.iter().map(f).collect(),
            grid: self.grid,
        }
    }
}

impl<T> Deref for PixelData<T> {
    type Target = Grid;

    fn deref(&self) -> &Self::Target {
        &self.grid
    }
}

impl<T> Index<usize> for PixelData<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.pixels[index]
    }
}

impl From<GrayImage> for IntensityField {
    fn from(value: GrayImage) -> Self {
        let grid = Grid::new(value.height() as usize, value.width() as usize);
        Self {
            pixels: value.into_raw(),
            grid,
        }
    }
}

impl IntensityField {
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.grid.width as u32, self.grid.height as u32, |x, y| {
            Luma([self.pixels[y as usize * self.grid.width + x as usize]])
        })
    }
}
