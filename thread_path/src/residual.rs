use std::ops::Index;

use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    darkness::Darkness,
    error::Result,
    image::{IntensityField, PixelData},
    Float, Grid,
};

/// What the residual field counts as unmet demand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Demand {
    /// `255 - intensity`: dark areas still waiting for thread.
    Dark,
    /// `intensity`: light background still waiting for thread.
    Light,
}

/// Per-cell remaining demand, always kept inside `[0, 255]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Residual<S> {
    data: PixelData<S>,
}

impl<S: Float> Residual<S> {
    pub fn from_field(field: &IntensityField, demand: Demand) -> Self
    where
        u8: AsPrimitive<S>,
    {
        Self {
            data: field.map(|&value| match demand {
                Demand::Dark => S::TWO_FIVE_FIVE - value.as_(),
                Demand::Light => value.as_(),
            }),
        }
    }

    /// Wraps raw demand values, clamping each one into `[0, 255]`.
    pub fn from_values(values: Vec<S>, grid: Grid) -> Result<Self> {
        let mut data = PixelData::from_raw(values, grid)?;
        for value in data.pixels_mut() {
            *value = value.max(S::ZERO).min(S::TWO_FIVE_FIVE);
        }
        Ok(Self { data })
    }

    /// Applies `darkness` to each cell in `indexes`.
    pub fn commit(&mut self, indexes: impl IntoIterator<Item = usize>, darkness: &impl Darkness<S>) {
        let pixels = self.data.pixels_mut();
        for index in indexes {
            pixels[index] = darkness.compute(pixels[index]);
        }
    }

    pub fn sum_over(&self, indexes: impl IntoIterator<Item = usize>) -> S {
        indexes.into_iter().map(|index| self.data[index]).sum()
    }

    pub fn total(&self) -> S {
        self.data.pixels().iter().copied().sum()
    }

    pub fn values(&self) -> &[S] {
        self.data.pixels()
    }

    pub fn grid(&self) -> &Grid {
        self.data.grid()
    }
}

impl<S> Index<usize> for Residual<S> {
    type Output = S;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}
