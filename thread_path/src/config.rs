use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, mask::ProtectedRegion, scoring::ScoringKind, Grid};

/// Everything a run needs besides the target image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Nails evenly spaced on the circle. At least 2.
    pub num_nails: usize,
    /// Side in pixels of the square canvas.
    pub image_size: usize,
    /// Distance in pixels between the canvas edge and the nail circle.
    pub nail_inset: usize,
    /// Maximum number of chords to place.
    pub num_lines: usize,
    /// Demand removed from every cell a placed chord crosses.
    pub line_darkness: f32,
    /// The search stops once the best candidate scores below this.
    pub min_improvement_score: f32,
    /// Residual above which a cell counts as dark for contour scoring.
    pub darkness_threshold: f32,
    /// Nail the thread starts from.
    pub start_nail: usize,
    pub scoring: ScoringKind,
    /// Regions whose weight is lowered for negative-space scoring.
    pub protected_regions: Vec<ProtectedRegion>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            num_nails: 720,
            image_size: 500,
            nail_inset: 5,
            num_lines: 1000,
            line_darkness: 25.0,
            min_improvement_score: 10.0,
            darkness_threshold: 10.0,
            start_nail: 0,
            scoring: ScoringKind::default(),
            protected_regions: Vec::new(),
        }
    }
}

impl Config {
    pub fn grid(&self) -> Grid {
        Grid::square(self.image_size)
    }

    pub fn radius(&self) -> isize {
        (self.image_size / 2) as isize - self.nail_inset as isize
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_nails < 2 {
            return Err(ConfigError::NailCount(self.num_nails));
        }
        if self.image_size == 0 {
            return Err(ConfigError::ImageSize);
        }
        if self.radius() <= 0 {
            return Err(ConfigError::Radius {
                size: self.image_size,
                inset: self.nail_inset,
            });
        }
        if self.start_nail >= self.num_nails {
            return Err(ConfigError::StartNail {
                start: self.start_nail,
                count: self.num_nails,
            });
        }
        if !(self.line_darkness.is_finite() && self.line_darkness > 0.0) {
            return Err(ConfigError::LineDarkness(self.line_darkness));
        }
        if self.min_improvement_score.is_nan() {
            return Err(ConfigError::MinImprovementScore);
        }
        if !self.darkness_threshold.is_finite() {
            return Err(ConfigError::DarknessThreshold(self.darkness_threshold));
        }
        self.protected_regions
            .iter()
            .try_for_each(ProtectedRegion::validate)
    }
}
