pub mod geometry {
    pub mod circle;
    pub mod point;

    pub use circle::Circle;
    pub use point::Point;
}

mod algorithm;
pub mod chord_table;
pub mod config;
pub mod darkness;
pub mod error;
mod float;
pub mod grid;
pub mod image;
pub mod mask;
pub mod nails;
pub mod path;
pub mod raster;
pub mod render;
pub mod residual;
pub mod scoring;
pub mod verboser;

pub use algorithm::*;
pub use config::Config;
pub use darkness::Darkness;
pub use error::{ConfigError, Error, Result};
pub use float::Float;
pub use grid::Grid;
pub use image::{preprocess, IntensityField, PixelData};
pub use mask::{ProtectedRegion, WeightMask};
pub use nails::NailSet;
pub use path::NailPath;
pub use residual::{Demand, Residual};
pub use scoring::{Scoring, ScoringKind};
