use std::ops::Range;

use image::RgbImage;
use log::{debug, info, trace};
use num_traits::AsPrimitive;
use palette::Srgba;
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};

use crate::{
    chord_table::ChordTable,
    config::Config,
    darkness::FlatDarkness,
    error::{ConfigError, Error, Result},
    image::IntensityField,
    mask::WeightMask,
    nails::NailSet,
    path::NailPath,
    render,
    residual::Residual,
    scoring::{Candidate, Scoring},
    verboser::{Message, Verboser},
    Float, Grid,
};

/// Validates `config`, lays out the nails over `field` and runs the greedy
/// search to completion.
pub fn compute<S: Float>(
    config: &Config,
    field: &IntensityField,
    verboser: &mut impl Verboser<S>,
) -> Result<Computation<S>>
where
    u8: AsPrimitive<S>,
    f32: AsPrimitive<S>,
    usize: AsPrimitive<S>,
{
    Ok(Search::from_config(config, field)?.run(verboser))
}

/// Why the search ended. Every variant leaves a usable path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stop {
    /// No candidate reached the minimum improvement score.
    EarlyExit,
    /// The configured number of chords was placed.
    MaxLines,
    /// The verboser asked to stop.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step<S> {
    Committed { nail: usize, score: S },
    Stopped(Stop),
}

/// Loop parameters, in the precision of the run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Params<S> {
    pub num_lines: usize,
    pub line_darkness: S,
    pub min_improvement_score: S,
    pub start_nail: usize,
}

impl<S: Float> Params<S> {
    pub fn from_config(config: &Config) -> Self
    where
        f32: AsPrimitive<S>,
    {
        Self {
            num_lines: config.num_lines,
            line_darkness: config.line_darkness.as_(),
            min_improvement_score: config.min_improvement_score.as_(),
            start_nail: config.start_nail,
        }
    }
}

/// Greedy chord-by-chord path search over an owned residual field.
pub struct Search<S> {
    nails: NailSet,
    chords: ChordTable,
    residual: Residual<S>,
    mask: WeightMask<S>,
    scoring: Scoring<S>,
    darkness: FlatDarkness<S>,
    num_lines: usize,
    min_improvement_score: S,
    current: usize,
    path: NailPath,
    stop: Option<Stop>,
    buffers: Vec<BatchBuffer<S>>,
}

impl<S: Float> Search<S>
where
    usize: AsPrimitive<S>,
{
    pub fn from_config(config: &Config, field: &IntensityField) -> Result<Self>
    where
        u8: AsPrimitive<S>,
        f32: AsPrimitive<S>,
    {
        config.validate()?;
        let grid = config.grid();
        if *field.grid() != grid {
            return Err(Error::FieldMismatch {
                expected: grid,
                actual: *field.grid(),
            });
        }
        let scoring = Scoring::from_kind(config.scoring, config.darkness_threshold.as_());
        let residual = Residual::from_field(field, scoring.demand());
        let mask = WeightMask::from_regions(grid, &config.protected_regions)?;
        let nails = NailSet::circle(grid, config.num_nails, config.nail_inset);
        Self::new(nails, residual, mask, scoring, Params::from_config(config))
    }

    pub fn new(
        nails: NailSet,
        residual: Residual<S>,
        mask: WeightMask<S>,
        scoring: Scoring<S>,
        params: Params<S>,
    ) -> Result<Self> {
        if nails.len() < 2 {
            return Err(ConfigError::NailCount(nails.len()).into());
        }
        if params.start_nail >= nails.len() {
            return Err(ConfigError::StartNail {
                start: params.start_nail,
                count: nails.len(),
            }
            .into());
        }
        if !(params.line_darkness.is_finite() && params.line_darkness > S::ZERO) {
            return Err(
                ConfigError::LineDarkness(params.line_darkness.to_f32().unwrap_or(f32::NAN)).into(),
            );
        }
        if params.min_improvement_score.is_nan() {
            return Err(ConfigError::MinImprovementScore.into());
        }
        if mask.grid() != residual.grid() {
            return Err(Error::FieldMismatch {
                expected: *residual.grid(),
                actual: *mask.grid(),
            });
        }
        let chords = ChordTable::new(*residual.grid(), &nails)?;
        debug!(
            "search over {} nails ({} chords) on a {}x{} grid, {:?}, up to {} lines",
            nails.len(),
            chords.len(),
            residual.grid().width,
            residual.grid().height,
            scoring.kind(),
            params.num_lines
        );

        Ok(Self {
            nails,
            chords,
            residual,
            mask,
            scoring,
            darkness: FlatDarkness(params.line_darkness),
            num_lines: params.num_lines,
            min_improvement_score: params.min_improvement_score,
            current: params.start_nail,
            path: NailPath::new(params.start_nail),
            stop: None,
            buffers: BatchBuffer::per_cpu(),
        })
    }

    /// Runs one iteration: scores every chord leaving the current nail and
    /// commits the best one, or reports why the search is over.
    pub fn step(&mut self) -> Step<S> {
        if let Some(stop) = self.stop {
            return Step::Stopped(stop);
        }
        if self.path.lines() >= self.num_lines {
            return self.halt(Stop::MaxLines);
        }
        match self.best_next() {
            Some((nail, score)) if score >= self.min_improvement_score => {
                let from = self.current;
                self.commit(nail);
                trace!("line {}: {from} -> {nail} (score {score})", self.path.lines());
                if self.path.lines() >= self.num_lines {
                    self.stop = Some(Stop::MaxLines);
                }
                Step::Committed { nail, score }
            }
            Some((_, score)) => {
                debug!("best score {score} is below {}", self.min_improvement_score);
                self.halt(Stop::EarlyExit)
            }
            None => self.halt(Stop::EarlyExit),
        }
    }

    /// Steps until a terminal state, reporting each chord to `verboser` and
    /// polling it for cancellation between iterations.
    pub fn run(mut self, verboser: &mut impl Verboser<S>) -> Computation<S> {
        loop {
            if self.stop.is_none() && verboser.cancelled() {
                self.stop = Some(Stop::Cancelled);
            }
            match self.step() {
                Step::Committed { nail, score } => verboser.verbose(Message::Committed {
                    line: self.path.lines(),
                    nail,
                    score,
                }),
                Step::Stopped(stop) => {
                    info!("placed {} lines, stopped: {stop:?}", self.path.lines());
                    verboser.verbose(Message::Finished {
                        lines: self.path.lines(),
                        stop,
                    });
                    return Computation {
                        grid: *self.residual.grid(),
                        nails: self.nails,
                        path: self.path,
                        residual: self.residual,
                        stop,
                    };
                }
            }
        }
    }

    pub fn path(&self) -> &NailPath {
        &self.path
    }

    pub fn nails(&self) -> &NailSet {
        &self.nails
    }

    pub fn residual(&self) -> &Residual<S> {
        &self.residual
    }

    pub fn grid(&self) -> Grid {
        *self.residual.grid()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn stop(&self) -> Option<Stop> {
        self.stop
    }

    fn halt(&mut self, stop: Stop) -> Step<S> {
        self.stop = Some(stop);
        Step::Stopped(stop)
    }

    fn commit(&mut self, nail: usize) {
        self.residual
            .commit(self.chords.indexes(self.current, nail), &self.darkness);
        self.current = nail;
        self.path.push(nail);
    }

    /// Highest scoring `(nail, score)` reachable from the current nail; ties go
    /// to the lowest nail index. `None` when every candidate is excluded.
    fn best_next(&mut self) -> Option<(usize, S)> {
        let count = self.nails.len();
        let chunk_size = count.div_ceil(self.buffers.len());
        for (index, buffer) in self.buffers.iter_mut().enumerate() {
            let start = (index * chunk_size).min(count);
            buffer.range = start..(start + chunk_size).min(count);
        }

        let chords = &self.chords;
        let residual = &self.residual;
        let mask = &self.mask;
        let scoring = &self.scoring;
        let current = self.current;
        self.buffers.par_iter_mut().for_each(|buffer| {
            buffer.best = None;
            for next in buffer.range.clone() {
                if next == current {
                    continue;
                }
                buffer.pixels.clear();
                buffer.pixels.extend(chords.indexes(current, next));
                let score = scoring.score(&Candidate {
                    pixels: &buffer.pixels,
                    residual,
                    mask,
                });
                if let Some(score) = score {
                    if buffer.best.map_or(true, |(_, best)| score > best) {
                        buffer.best = Some((next, score));
                    }
                }
            }
        });

        // Buffers hold ascending ranges, so keeping the first strict maximum
        // matches a sequential scan.
        self.buffers
            .iter()
            .filter_map(|buffer| buffer.best)
            .fold(None, |best, (nail, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((nail, score)),
            })
    }
}

/// Per-worker slice of the candidate scan.
struct BatchBuffer<S> {
    range: Range<usize>,
    pixels: Vec<usize>,
    best: Option<(usize, S)>,
}

impl<S> BatchBuffer<S> {
    fn per_cpu() -> Vec<Self> {
        (0..num_cpus::get().max(1))
            .map(|_| Self {
                range: 0..0,
                pixels: Vec::new(),
                best: None,
            })
            .collect()
    }
}

/// Finished search: the path plus what is needed to render it.
pub struct Computation<S> {
    grid: Grid,
    nails: NailSet,
    path: NailPath,
    residual: Residual<S>,
    stop: Stop,
}

impl<S> Computation<S> {
    pub fn path(&self) -> &NailPath {
        &self.path
    }

    pub fn into_path(self) -> NailPath {
        self.path
    }

    pub fn stop(&self) -> Stop {
        self.stop
    }

    pub fn nails(&self) -> &NailSet {
        &self.nails
    }

    /// Demand left unmet when the search stopped.
    pub fn residual(&self) -> &Residual<S> {
        &self.residual
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn build_rgb(&self, color: Srgba<u8>) -> RgbImage {
        render::build_rgb(self.grid, &self.nails, &self.path, color)
    }

    pub fn build_svg(&self, color: Srgba<u8>, stroke_width: f32) -> svg::Document {
        render::build_svg(self.grid, &self.nails, &self.path, color, stroke_width)
    }

    /// Comma-joined nail indices in thread order.
    pub fn build_instructions(&self) -> String {
        self.path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::Point, image::PixelData, residual::Demand, verboser::Silent};

    fn line_search(values: Vec<f32>, params: Params<f32>) -> Search<f32> {
        let grid = Grid::new(1, values.len());
        let nails = NailSet::from_points(
            (0..values.len() as isize).map(|x| Point::new(x, 0)).collect(),
        );
        Search::new(
            nails,
            Residual::from_values(values, grid).unwrap(),
            WeightMask::uniform(grid),
            Scoring::AggregateSum,
            params,
        )
        .unwrap()
    }

    fn params(num_lines: usize, min_improvement_score: f32) -> Params<f32> {
        Params {
            num_lines,
            line_darkness: 50.0,
            min_improvement_score,
            start_nail: 0,
        }
    }

    #[test]
    fn zero_lines_stops_immediately() {
        let mut search = line_search(vec![100.0; 5], params(0, 0.0));
        assert_eq!(search.step(), Step::Stopped(Stop::MaxLines));
        assert_eq!(&**search.path(), &[0]);
    }

    #[test]
    fn step_commits_then_reports_max_lines() {
        let mut search = line_search(vec![0.0, 10.0, 10.0, 200.0], params(1, 0.0));
        // 0 -> 3 covers every cell: 220
        assert_eq!(search.step(), Step::Committed { nail: 3, score: 220.0 });
        assert_eq!(search.residual().values(), &[0.0, 0.0, 0.0, 150.0]);
        assert_eq!(search.step(), Step::Stopped(Stop::MaxLines));
        assert_eq!(search.stop(), Some(Stop::MaxLines));
    }

    #[test]
    fn ties_go_to_lowest_index() {
        // every chord from nail 2 to its neighbours scores the same
        let mut search = line_search(
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            Params {
                start_nail: 2,
                ..params(1, 0.0)
            },
        );
        assert_eq!(search.step(), Step::Committed { nail: 0, score: 0.0 });
    }

    #[test]
    fn cancellation_is_checked_between_iterations() {
        struct CancelAfter(usize, usize);
        impl Verboser<f32> for CancelAfter {
            fn verbose(&mut self, message: Message<f32>) {
                if let Message::Committed { .. } = message {
                    self.1 += 1;
                }
            }
            fn cancelled(&self) -> bool {
                self.1 >= self.0
            }
        }

        let search = line_search(vec![200.0; 6], params(50, 0.0));
        let mut verboser = CancelAfter(3, 0);
        let computation = search.run(&mut verboser);
        assert_eq!(computation.stop(), Stop::Cancelled);
        assert_eq!(computation.path().lines(), 3);
    }

    #[test]
    fn invalid_setup_is_rejected() {
        let grid = Grid::square(3);
        let residual = Residual::from_values(vec![1.0f32; 9], grid).unwrap();
        let mask = WeightMask::uniform(grid);
        let one_nail = Search::new(
            NailSet::from_points(vec![Point::new(0, 0)]),
            residual.clone(),
            mask.clone(),
            Scoring::AggregateSum,
            params(1, 0.0),
        );
        assert!(matches!(one_nail, Err(Error::Config(ConfigError::NailCount(1)))));

        let two_nails = || NailSet::from_points(vec![Point::new(0, 0), Point::new(2, 2)]);
        let bad_start = Search::new(
            two_nails(),
            residual.clone(),
            mask.clone(),
            Scoring::AggregateSum,
            Params {
                start_nail: 2,
                ..params(1, 0.0)
            },
        );
        assert!(matches!(bad_start, Err(Error::Config(ConfigError::StartNail { .. }))));

        let bad_mask = Search::new(
            two_nails(),
            residual,
            WeightMask::uniform(Grid::square(4)),
            Scoring::AggregateSum,
            params(1, 0.0),
        );
        assert!(matches!(bad_mask, Err(Error::FieldMismatch { .. })));
    }

    #[test]
    fn compute_checks_field_size() {
        let config = Config {
            image_size: 20,
            num_nails: 16,
            ..Default::default()
        };
        let field = PixelData::filled(0u8, Grid::square(10));
        let result = compute::<f32>(&config, &field, &mut Silent);
        assert!(matches!(result, Err(Error::FieldMismatch { .. })));
    }

    #[test]
    fn compute_negative_space_uses_light_demand() {
        let config = Config {
            image_size: 20,
            num_nails: 16,
            num_lines: 5,
            scoring: crate::scoring::ScoringKind::NegativeSpace,
            ..Default::default()
        };
        // black image: no light demand, nothing to do
        let field = PixelData::filled(0u8, config.grid());
        let computation = compute::<f64>(&config, &field, &mut Silent).unwrap();
        assert_eq!(computation.stop(), Stop::EarlyExit);
        assert_eq!(computation.path().lines(), 0);
        assert_eq!(
            computation.residual(),
            &Residual::from_field(&field, Demand::Light)
        );
    }
}
