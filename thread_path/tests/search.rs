use rand::{rngs::SmallRng, Rng, SeedableRng};
use test_case::test_case;
use thread_path::{
    compute,
    darkness::FlatDarkness,
    geometry::Point,
    verboser::{Message, Silent, Verboser},
    Config, ConfigError, Error, Grid, IntensityField, NailSet, Params, PixelData, ProtectedRegion,
    Residual, Scoring, ScoringKind, Search, Step, Stop, WeightMask,
};

#[derive(Default)]
struct Recorder(Vec<Message<f64>>);

impl Verboser<f64> for Recorder {
    fn verbose(&mut self, message: Message<f64>) {
        self.0.push(message);
    }
}

fn uniform_field(size: usize, intensity: u8) -> IntensityField {
    PixelData::filled(intensity, Grid::square(size))
}

fn params(num_lines: usize) -> Params<f32> {
    Params {
        num_lines,
        line_darkness: 25.0,
        min_improvement_score: 10.0,
        start_nail: 0,
    }
}

#[test]
fn checkerboard_first_chord() {
    let config = Config {
        num_nails: 8,
        image_size: 4,
        nail_inset: 0,
        num_lines: 1,
        ..Default::default()
    };
    // residual 200 on odd cells, 0 elsewhere
    let field = PixelData::new(
        |p: Point<usize>| if (p.x + p.y) % 2 == 1 { 55 } else { 255 },
        config.grid(),
    );

    let mut search = Search::<f64>::from_config(&config, &field).unwrap();
    assert_eq!(search.step(), Step::Committed { nail: 3, score: 600.0 });
    assert_eq!(search.step(), Step::Stopped(Stop::MaxLines));
    assert_eq!(&**search.path(), &[0, 3]);
}

#[test]
fn white_image_exits_early() {
    let config = Config {
        num_nails: 36,
        image_size: 40,
        ..Default::default()
    };
    let computation = compute::<f32>(&config, &uniform_field(40, 255), &mut Silent).unwrap();
    assert_eq!(computation.stop(), Stop::EarlyExit);
    assert_eq!(&**computation.path(), &[0]);
    assert_eq!(computation.build_instructions(), "0");
}

#[test_case(ScoringKind::AggregateSum)]
#[test_case(ScoringKind::AverageBrightness)]
#[test_case(ScoringKind::ContourContinuity)]
fn black_image_places_every_line(scoring: ScoringKind) {
    let config = Config {
        num_nails: 32,
        image_size: 50,
        num_lines: 20,
        scoring,
        ..Default::default()
    };
    let computation = compute::<f32>(&config, &uniform_field(50, 0), &mut Silent).unwrap();
    assert_eq!(computation.stop(), Stop::MaxLines);
    assert_eq!(computation.path().len(), 21);
    assert!(computation.path().iter().all(|&nail| nail < 32));
    assert!(computation
        .path()
        .chords()
        .all(|(from, to)| from != to));
}

#[test]
fn zero_lines_keeps_start_nail() {
    let config = Config {
        num_nails: 16,
        image_size: 30,
        num_lines: 0,
        start_nail: 5,
        ..Default::default()
    };
    let computation = compute::<f32>(&config, &uniform_field(30, 0), &mut Silent).unwrap();
    assert_eq!(computation.stop(), Stop::MaxLines);
    assert_eq!(&**computation.path(), &[5]);
}

#[test]
fn messages_follow_committed_lines() {
    let config = Config {
        num_nails: 24,
        image_size: 40,
        num_lines: 7,
        ..Default::default()
    };
    let mut recorder = Recorder::default();
    let computation = compute::<f64>(&config, &uniform_field(40, 0), &mut recorder).unwrap();

    assert_eq!(recorder.0.len(), 8);
    for (index, message) in recorder.0[..7].iter().enumerate() {
        match message {
            Message::Committed { line, nail, .. } => {
                assert_eq!(*line, index + 1);
                assert_eq!(*nail, computation.path()[index + 1]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert_eq!(
        recorder.0[7],
        Message::Finished {
            lines: 7,
            stop: Stop::MaxLines
        }
    );
}

#[test]
fn invalid_config_is_reported() {
    let config = Config {
        num_nails: 1,
        image_size: 10,
        ..Default::default()
    };
    let result = compute::<f32>(&config, &uniform_field(10, 0), &mut Silent);
    assert!(matches!(result, Err(Error::Config(ConfigError::NailCount(1)))));
}

#[test]
fn residual_stays_in_range() {
    let mut rng = SmallRng::seed_from_u64(7);
    let grid = Grid::square(32);
    let values: Vec<f32> = (0..grid.len()).map(|_| rng.gen_range(0.0..=255.0)).collect();
    let mut residual = Residual::<f32>::from_values(values, grid).unwrap();
    let nails = NailSet::circle(grid, 40, 1);

    for _ in 0..500 {
        let a = rng.gen_range(0..nails.len());
        let b = rng.gen_range(0..nails.len());
        let darkness = FlatDarkness(rng.gen_range(1.0f32..300.0));
        residual.commit(grid.indexes_in(nails.chord(a, b)), &darkness);
        assert!(residual
            .values()
            .iter()
            .all(|value| (0.0..=255.0).contains(value)));
    }
}

#[test]
fn repeated_commits_only_lower_the_residual() {
    let grid = Grid::square(20);
    let mut residual = Residual::<f64>::from_values(vec![180.0; grid.len()], grid).unwrap();
    let nails = NailSet::circle(grid, 12, 0);
    let cells: Vec<usize> = grid.indexes_in(nails.chord(0, 6)).collect();

    let mut previous = residual.sum_over(cells.iter().copied());
    for _ in 0..10 {
        residual.commit(cells.iter().copied(), &FlatDarkness(25.0));
        let current = residual.sum_over(cells.iter().copied());
        assert!(current <= previous);
        previous = current;
    }
    assert_eq!(previous, 0.0);
}

/// Nails at three corners of a 20x20 grid: 1 sits along row 0 from nail 0,
/// 2 along column 0.
fn corner_search(scoring: Scoring<f32>, values: Vec<f32>) -> Search<f32> {
    let grid = Grid::square(20);
    let nails = NailSet::from_points(vec![Point::new(0, 0), Point::new(19, 0), Point::new(0, 19)]);
    Search::new(
        nails,
        Residual::from_values(values, grid).unwrap(),
        WeightMask::uniform(grid),
        scoring,
        params(1),
    )
    .unwrap()
}

fn edge_values() -> Vec<f32> {
    let mut values = vec![0.0; 400];
    // one unbroken run of 6 on row 0
    values[2..=7].fill(200.0);
    // two runs of 5 on column 0
    for y in (2..=6).chain(9..=13) {
        values[y * 20] = 200.0;
    }
    values
}

#[test]
fn contour_prefers_one_continuous_edge() {
    let mut search = corner_search(
        Scoring::ContourContinuity {
            darkness_threshold: 10.0,
        },
        edge_values(),
    );
    assert_eq!(
        search.step(),
        Step::Committed {
            nail: 1,
            score: 36.0 + 10_000_000.0
        }
    );
}

#[test]
fn aggregate_prefers_more_dark_cells() {
    let mut search = corner_search(Scoring::AggregateSum, edge_values());
    assert_eq!(search.step(), Step::Committed { nail: 2, score: 2000.0 });
}

#[test]
fn negative_space_avoids_protected_region() {
    let grid = Grid::square(10);
    let nails = || NailSet::from_points(vec![Point::new(0, 2), Point::new(9, 2), Point::new(0, 7)]);
    let residual = || Residual::<f32>::from_values(vec![200.0; 100], grid).unwrap();
    let protected = WeightMask::from_regions(grid, &[ProtectedRegion::new(0, 0, 10, 5, 0.1)]).unwrap();

    let mut unprotected = Search::new(
        nails(),
        residual(),
        WeightMask::uniform(grid),
        Scoring::NegativeSpace,
        params(1),
    )
    .unwrap();
    assert!(matches!(unprotected.step(), Step::Committed { nail: 1, .. }));

    let mut search = Search::new(nails(), residual(), protected, Scoring::NegativeSpace, params(1)).unwrap();
    assert!(matches!(search.step(), Step::Committed { nail: 2, .. }));
}

#[test]
fn ties_and_parallel_scan_are_deterministic() {
    let config = Config {
        num_nails: 64,
        image_size: 100,
        num_lines: 30,
        scoring: ScoringKind::AverageBrightness,
        ..Default::default()
    };
    let field = uniform_field(100, 55);
    let first = compute::<f32>(&config, &field, &mut Silent).unwrap();
    let second = compute::<f32>(&config, &field, &mut Silent).unwrap();

    // every chord from the start nail averages the same demand
    assert_eq!(first.path()[1], 1);
    assert_eq!(first.path(), second.path());
    assert_eq!(first.residual(), second.residual());
}

#[test]
fn all_chords_off_canvas_exit_early() {
    let grid = Grid::square(4);
    let nails = NailSet::from_points(vec![Point::new(-5, -5), Point::new(-9, -1), Point::new(20, -3)]);
    let mut search = Search::new(
        nails,
        Residual::from_values(vec![200.0; grid.len()], grid).unwrap(),
        WeightMask::uniform(grid),
        Scoring::AggregateSum,
        Params {
            min_improvement_score: f32::NEG_INFINITY,
            ..params(5)
        },
    )
    .unwrap();
    assert_eq!(search.step(), Step::Stopped(Stop::EarlyExit));
    assert_eq!(&**search.path(), &[0]);
    assert!(search.residual().values().iter().all(|&value| value == 200.0));
}

#[test]
fn off_canvas_chord_loses_to_any_scored_chord() {
    // nail 1 is off the canvas, nail 2 reaches a cell with no demand left
    let grid = Grid::square(4);
    let nails = NailSet::from_points(vec![Point::new(-3, 0), Point::new(-9, 0), Point::new(0, 0)]);
    let mut values = vec![200.0; grid.len()];
    values[0] = 0.0;
    let mut search = Search::new(
        nails,
        Residual::from_values(values, grid).unwrap(),
        WeightMask::uniform(grid),
        Scoring::AggregateSum,
        Params {
            min_improvement_score: f32::NEG_INFINITY,
            ..params(1)
        },
    )
    .unwrap();
    assert_eq!(search.step(), Step::Committed { nail: 2, score: 0.0 });
}
