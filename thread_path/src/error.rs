use crate::grid::Grid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can stop a run before the first chord is placed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("expected {expected} values for a {grid:?} grid, got {actual}")]
    FieldSize {
        grid: Grid,
        expected: usize,
        actual: usize,
    },
    #[error("field is {actual:?} but the run is configured for {expected:?}")]
    FieldMismatch { expected: Grid, actual: Grid },
    #[error("{grid:?} grid has too many cells to index")]
    GridTooLarge { grid: Grid },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("at least 2 nails are required, got {0}")]
    NailCount(usize),
    #[error("image size must be positive")]
    ImageSize,
    #[error("nail inset {inset} leaves no radius on a {size}px canvas")]
    Radius { size: usize, inset: usize },
    #[error("start nail {start} is out of range for {count} nails")]
    StartNail { start: usize, count: usize },
    #[error("line darkness must be a positive number, got {0}")]
    LineDarkness(f32),
    #[error("minimum improvement score must be a number")]
    MinImprovementScore,
    #[error("darkness threshold must be finite, got {0}")]
    DarknessThreshold(f32),
    #[error("protected region weight must lie in [0, 1], got {0}")]
    RegionWeight(f32),
    #[error("protected region must have a positive width and height")]
    RegionSize,
}
