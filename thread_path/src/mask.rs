use std::ops::Index;

use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, image::PixelData, Float, Grid};

/// Axis-aligned box whose inscribed ellipse gets a reduced scoring weight,
/// e.g. a detected eye.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtectedRegion {
    pub x: isize,
    pub y: isize,
    pub width: usize,
    pub height: usize,
    /// Multiplier in `[0, 1]` applied inside the ellipse.
    #[serde(default = "ProtectedRegion::default_weight")]
    pub weight: f32,
}

impl ProtectedRegion {
    pub const DEFAULT_WEIGHT: f32 = 0.1;

    fn default_weight() -> f32 {
        Self::DEFAULT_WEIGHT
    }

    pub fn new(x: isize, y: isize, width: usize, height: usize, weight: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            weight,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::RegionSize);
        }
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(ConfigError::RegionWeight(self.weight));
        }
        Ok(())
    }

    /// Whether the cell at column `x`, row `y` lies inside the inscribed ellipse.
    fn contains(&self, x: isize, y: isize) -> bool {
        let rx = self.width as f64 / 2.0;
        let ry = self.height as f64 / 2.0;
        let dx = (x as f64 - (self.x as f64 + rx - 0.5)) / rx;
        let dy = (y as f64 - (self.y as f64 + ry - 0.5)) / ry;
        dx * dx + dy * dy <= 1.0
    }
}

/// Static per-cell multiplier used by negative-space scoring. 1 means unprotected.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightMask<S> {
    data: PixelData<S>,
}

impl<S: Float> WeightMask<S> {
    pub fn uniform(grid: Grid) -> Self {
        Self {
            data: PixelData::filled(S::ONE, grid),
        }
    }

    /// Builds the mask from `regions`; overlapping regions keep the lowest weight.
    pub fn from_regions(grid: Grid, regions: &[ProtectedRegion]) -> Result<Self, ConfigError>
    where
        f32: AsPrimitive<S>,
    {
        let mut mask = Self::uniform(grid);
        for region in regions {
            region.validate()?;
            let weight: S = region.weight.as_();
            let x_range = clip(region.x, region.width, grid.width);
            let y_range = clip(region.y, region.height, grid.height);
            let pixels = mask.data.pixels_mut();
            for y in y_range {
                for x in x_range.clone() {
                    if region.contains(x as isize, y as isize) {
                        let cell = &mut pixels[y * grid.width + x];
                        *cell = cell.min(weight);
                    }
                }
            }
        }
        Ok(mask)
    }

    pub fn mean_over(&self, indexes: impl IntoIterator<Item = usize>) -> Option<S>
    where
        usize: AsPrimitive<S>,
    {
        mean(indexes.into_iter().map(|index| self.data[index]))
    }

    pub fn values(&self) -> &[S] {
        self.data.pixels()
    }

    pub fn grid(&self) -> &Grid {
        self.data.grid()
    }
}

impl<S> Index<usize> for WeightMask<S> {
    type Output = S;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

/// Part of `start..start + len` that falls inside `0..limit`.
fn clip(start: isize, len: usize, limit: usize) -> std::ops::Range<usize> {
    let end = (start + len as isize).clamp(0, limit as isize) as usize;
    let start = start.clamp(0, limit as isize) as usize;
    start..end
}

pub(crate) fn mean<S: Float>(values: impl Iterator<Item = S>) -> Option<S>
where
    usize: AsPrimitive<S>,
{
    let (sum, count) = values.fold((S::ZERO, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count.as_())
}
