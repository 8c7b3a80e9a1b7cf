//! Candidate chord scoring policies.
//!
//! Every policy looks only at the in-bounds cells of one chord, in
//! rasterization order, and returns `None` when there are none so that such a
//! chord can never be selected. Higher scores are better.

use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

use crate::{
    mask::{mean, WeightMask},
    residual::{Demand, Residual},
    Float, Grid,
};

/// Serializable policy selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoringKind {
    #[default]
    AggregateSum,
    AverageBrightness,
    ContourContinuity,
    NegativeSpace,
}

/// Active scoring policy with its parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scoring<S> {
    AggregateSum,
    AverageBrightness,
    ContourContinuity { darkness_threshold: S },
    NegativeSpace,
}

/// Everything a policy may read about one candidate chord.
#[derive(Clone, Copy)]
pub struct Candidate<'a, S> {
    /// Flat indexes of the chord's in-bounds cells, in rasterization order.
    pub pixels: &'a [usize],
    pub residual: &'a Residual<S>,
    pub mask: &'a WeightMask<S>,
}

impl<S: Float> Scoring<S>
where
    usize: AsPrimitive<S>,
{
    pub fn from_kind(kind: ScoringKind, darkness_threshold: S) -> Self {
        match kind {
            ScoringKind::AggregateSum => Self::AggregateSum,
            ScoringKind::AverageBrightness => Self::AverageBrightness,
            ScoringKind::ContourContinuity => Self::ContourContinuity { darkness_threshold },
            ScoringKind::NegativeSpace => Self::NegativeSpace,
        }
    }

    pub fn kind(&self) -> ScoringKind {
        match self {
            Self::AggregateSum => ScoringKind::AggregateSum,
            Self::AverageBrightness => ScoringKind::AverageBrightness,
            Self::ContourContinuity { .. } => ScoringKind::ContourContinuity,
            Self::NegativeSpace => ScoringKind::NegativeSpace,
        }
    }

    /// Residual semantics this policy is meant to run against.
    pub fn demand(&self) -> Demand {
        match self {
            Self::NegativeSpace => Demand::Light,
            _ => Demand::Dark,
        }
    }

    pub fn score(&self, candidate: &Candidate<'_, S>) -> Option<S> {
        match *self {
            Self::AggregateSum => aggregate_sum(candidate),
            Self::AverageBrightness => average_brightness(candidate),
            Self::ContourContinuity { darkness_threshold } => {
                contour_continuity(candidate, darkness_threshold)
            }
            Self::NegativeSpace => negative_space(candidate),
        }
    }
}

/// Total residual under the chord. Favors long chords.
pub fn aggregate_sum<S: Float>(candidate: &Candidate<'_, S>) -> Option<S> {
    if candidate.pixels.is_empty() {
        return None;
    }
    Some(candidate.residual.sum_over(candidate.pixels.iter().copied()))
}

/// Mean residual under the chord, free of the length bias of [`aggregate_sum`].
pub fn average_brightness<S: Float>(candidate: &Candidate<'_, S>) -> Option<S>
where
    usize: AsPrimitive<S>,
{
    mean(candidate.pixels.iter().map(|&index| candidate.residual[index]))
}

/// Two-tier contour score.
///
/// Cells whose residual exceeds `darkness_threshold` form maximal runs. With no
/// run the score is zero; with exactly one run it is the squared run length
/// plus [`single_run_bonus`]; with several it is the sum of squared run
/// lengths. A chord tracing one unbroken edge therefore always beats a chord
/// clipping several unrelated dark areas.
pub fn contour_continuity<S: Float>(candidate: &Candidate<'_, S>, darkness_threshold: S) -> Option<S>
where
    usize: AsPrimitive<S>,
{
    if candidate.pixels.is_empty() {
        return None;
    }
    let mut segments = 0usize;
    let mut continuity = 0usize;
    let mut run = 0usize;
    for &index in candidate.pixels {
        if candidate.residual[index] > darkness_threshold {
            run += 1;
        } else if run > 0 {
            segments += 1;
            continuity += run * run;
            run = 0;
        }
    }
    if run > 0 {
        segments += 1;
        continuity += run * run;
    }

    Some(match segments {
        0 => S::ZERO,
        1 => continuity.as_() + single_run_bonus(candidate.residual.grid()),
        _ => continuity.as_(),
    })
}

/// Bonus of a single-run contour chord: [`Float::SINGLE_RUN_BONUS`], raised
/// to the squared longest grid side on canvases large enough for a multi-run
/// chord to reach it. A chord has at most that many in-bounds cells.
pub fn single_run_bonus<S: Float>(grid: &Grid) -> S
where
    usize: AsPrimitive<S>,
{
    let side: S = grid.width.max(grid.height).as_();
    S::SINGLE_RUN_BONUS.max(side * side)
}

/// Mean light demand scaled by the mean protection weight under the chord.
pub fn negative_space<S: Float>(candidate: &Candidate<'_, S>) -> Option<S>
where
    usize: AsPrimitive<S>,
{
    let brightness = average_brightness(candidate)?;
    let weight = candidate.mask.mean_over(candidate.pixels.iter().copied())?;
    Some(brightness * weight)
}
