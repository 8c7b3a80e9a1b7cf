use std::{
    fmt,
    fs::{self, File},
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
use num_traits::AsPrimitive;
use palette::Srgba;
use thiserror::Error;
use thread_path::{
    image, render,
    verboser::{Message, Verboser},
    Config, Float, IntensityField, ProtectedRegion, ScoringKind, Search, Step,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Input image path.
    #[arg()]
    input: PathBuf,

    /// JSON configuration file. Flags given on the command line take precedence.
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Number of nails around the circle.
    #[arg(short, long)]
    nails: Option<usize>,

    /// Side in pixels of the square working canvas.
    #[arg(short, long)]
    size: Option<usize>,

    /// Maximum number of chords.
    #[arg(short, long)]
    lines: Option<usize>,

    /// Demand removed from each pixel a chord crosses.
    #[arg(short, long)]
    darkness: Option<f32>,

    /// Stop once the best chord scores below this.
    #[arg(long)]
    min_score: Option<f32>,

    /// Darkness threshold for contour scoring.
    #[arg(long)]
    threshold: Option<f32>,

    /// Nail the thread starts from.
    #[arg(long)]
    start: Option<usize>,

    #[arg(long)]
    scoring: Option<Scoring>,

    /// Pixels between the canvas edge and the nail circle.
    #[arg(long)]
    inset: Option<usize>,

    /// Protected region as `x,y,w,h` or `x,y,w,h:weight`. Repeatable.
    #[arg(long, value_parser = parse_region)]
    protect: Vec<ProtectedRegion>,

    /// Precision of calculations (Single/Double).
    #[arg(short, long, default_value_t = Precision::Single)]
    precision: Precision,

    /// Thread color as #RGB, #RRGGBB or #RRGGBBAA.
    #[arg(long, value_parser = parse_hex_color)]
    color: Option<Srgba<u8>>,

    /// Stroke width of the SVG output.
    #[arg(long, default_value_t = 0.5)]
    stroke_width: f32,

    /// Write a snapshot every N chords.
    #[arg(short, long)]
    interval: Option<usize>,

    /// Output directory. Defaults to `output` next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

impl Args {
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config_file {
            Some(path) => {
                let file = File::open(path)
                    .with_context(|| format!("opening config file {}", path.display()))?;
                serde_json::from_reader(BufReader::new(file))
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Config::default(),
        };
        if let Some(nails) = self.nails {
            config.num_nails = nails;
        }
        if let Some(size) = self.size {
            config.image_size = size;
        }
        if let Some(lines) = self.lines {
            config.num_lines = lines;
        }
        if let Some(darkness) = self.darkness {
            config.line_darkness = darkness;
        }
        if let Some(min_score) = self.min_score {
            config.min_improvement_score = min_score;
        }
        if let Some(threshold) = self.threshold {
            config.darkness_threshold = threshold;
        }
        if let Some(start) = self.start {
            config.start_nail = start;
        }
        if let Some(scoring) = self.scoring {
            config.scoring = scoring.into();
        }
        if let Some(inset) = self.inset {
            config.nail_inset = inset;
        }
        config.protected_regions.extend(self.protect.iter().copied());
        config.validate()?;
        Ok(config)
    }
}

#[derive(Debug, Error)]
enum RegionParseError {
    #[error("invalid region format, use 'x,y,w,h' or 'x,y,w,h:weight'")]
    InvalidFormat,
    #[error("invalid region number '{0}'")]
    InvalidNumber(String),
}

fn parse_region(s: &str) -> Result<ProtectedRegion, RegionParseError> {
    let (rect, weight) = match s.split_once(':') {
        Some((rect, weight)) => (rect, Some(weight)),
        None => (s, None),
    };
    let parts: Vec<&str> = rect.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts[..] else {
        return Err(RegionParseError::InvalidFormat);
    };
    fn number<T: std::str::FromStr>(s: &str) -> Result<T, RegionParseError> {
        s.trim()
            .parse()
            .map_err(|_| RegionParseError::InvalidNumber(s.to_string()))
    }
    Ok(ProtectedRegion::new(
        number(x)?,
        number(y)?,
        number(w)?,
        number(h)?,
        weight
            .map(number::<f32>)
            .transpose()?
            .unwrap_or(ProtectedRegion::DEFAULT_WEIGHT),
    ))
}

#[derive(Debug, Error)]
enum ColorParseError {
    #[error("invalid hex color, use #RGB, #RRGGBB or #RRGGBBAA")]
    InvalidHex,
}

fn parse_hex_color(s: &str) -> Result<Srgba<u8>, ColorParseError> {
    let s = s.trim();
    let s = s
        .strip_prefix('#')
        .or_else(|| s.strip_prefix("0x"))
        .unwrap_or(s);
    if !s.is_ascii() {
        return Err(ColorParseError::InvalidHex);
    }
    fn channel(hex: &str) -> Result<u8, ColorParseError> {
        u8::from_str_radix(hex, 16).map_err(|_| ColorParseError::InvalidHex)
    }

    let alpha = render::THREAD.alpha;
    match s.len() {
        8 => Ok(Srgba::new(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
            channel(&s[6..8])?,
        )),
        6 => Ok(Srgba::new(
            channel(&s[0..2])?,
            channel(&s[2..4])?,
            channel(&s[4..6])?,
            alpha,
        )),
        3 => Ok(Srgba::new(
            channel(&s[0..1].repeat(2))?,
            channel(&s[1..2].repeat(2))?,
            channel(&s[2..3].repeat(2))?,
            alpha,
        )),
        _ => Err(ColorParseError::InvalidHex),
    }
}

#[derive(Clone, Copy, Debug)]
enum Scoring {
    AggregateSum,
    AverageBrightness,
    ContourContinuity,
    NegativeSpace,
}

impl ValueEnum for Scoring {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::AggregateSum,
            Self::AverageBrightness,
            Self::ContourContinuity,
            Self::NegativeSpace,
        ]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::AggregateSum => clap::builder::PossibleValue::new("aggregate-sum")
                .alias("sum")
                .alias("greedy"),
            Self::AverageBrightness => {
                clap::builder::PossibleValue::new("average-brightness").alias("average")
            }
            Self::ContourContinuity => {
                clap::builder::PossibleValue::new("contour-continuity").alias("contour")
            }
            Self::NegativeSpace => {
                clap::builder::PossibleValue::new("negative-space").alias("negative")
            }
        })
    }
}

impl From<Scoring> for ScoringKind {
    fn from(scoring: Scoring) -> Self {
        match scoring {
            Scoring::AggregateSum => Self::AggregateSum,
            Scoring::AverageBrightness => Self::AverageBrightness,
            Scoring::ContourContinuity => Self::ContourContinuity,
            Scoring::NegativeSpace => Self::NegativeSpace,
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Precision {
    Single,
    Double,
}

impl ValueEnum for Precision {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Single, Self::Double]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Single => clap::builder::PossibleValue::new("Single")
                .alias("single")
                .alias("f32"),
            Self::Double => clap::builder::PossibleValue::new("Double")
                .alias("double")
                .alias("f64"),
        })
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("Single"),
            Self::Double => f.write_str("Double"),
        }
    }
}

/// Logs search progress every `every` chords.
struct Progress {
    every: usize,
}

impl<S: Float> Verboser<S> for Progress {
    fn verbose(&mut self, message: Message<S>) {
        if let Message::Committed { line, nail, score } = message {
            if line % self.every == 0 {
                info!("{line} lines placed, last nail {nail} (score {score})");
            }
        }
    }
}

/// Where the output files of one input go.
struct Output {
    dir: PathBuf,
    stem: String,
}

impl Output {
    fn new(args: &Args) -> anyhow::Result<Self> {
        let stem = args
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .context("input path has no file name")?
            .to_string();
        let dir = match &args.output {
            Some(dir) => dir.clone(),
            None => args.input.parent().unwrap_or(Path::new(".")).join("output"),
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
        Ok(Self { dir, stem })
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{suffix}", self.stem))
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .parse_default_env()
        .init();

    let config = args.config()?;
    let output = Output::new(&args)?;
    let field = image::load(&args.input, config.image_size as u32)
        .with_context(|| format!("loading image {}", args.input.display()))?;
    let input_path = output.file("_input.png");
    field
        .to_gray_image()
        .save(&input_path)
        .with_context(|| format!("writing {}", input_path.display()))?;

    match args.precision {
        Precision::Single => with_precision::<f32>(&args, &config, &field, &output),
        Precision::Double => with_precision::<f64>(&args, &config, &field, &output),
    }
}

fn with_precision<S: Float>(
    args: &Args,
    config: &Config,
    field: &IntensityField,
    output: &Output,
) -> anyhow::Result<()>
where
    u8: AsPrimitive<S>,
    f32: AsPrimitive<S>,
    usize: AsPrimitive<S>,
{
    let color = args.color.unwrap_or(render::THREAD);
    let mut search = Search::<S>::from_config(config, field)?;

    if let Some(interval) = args.interval.filter(|&interval| interval > 0) {
        while let Step::Committed { .. } = search.step() {
            let lines = search.path().lines();
            if lines % interval == 0 {
                let image = render::build_rgb(search.grid(), search.nails(), search.path(), color);
                let path = output.file(&format!("_{lines}.png"));
                image
                    .save(&path)
                    .with_context(|| format!("writing {}", path.display()))?;
                let path = output.file(&format!("_{lines}_path.txt"));
                fs::write(&path, search.path().to_string())
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
    }

    let computation = search.run(&mut Progress { every: 100 });

    let path = output.file("_path.txt");
    fs::write(&path, computation.build_instructions())
        .with_context(|| format!("writing {}", path.display()))?;
    let path = output.file(".png");
    computation
        .build_rgb(color)
        .save(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    let path = output.file(".svg");
    svg::save(&path, &computation.build_svg(color, args.stroke_width))
        .with_context(|| format!("writing {}", path.display()))?;

    info!(
        "{} lines, stopped: {:?}, remaining demand {}, output in {}",
        computation.path().lines(),
        computation.stop(),
        computation.residual().total(),
        output.dir.display()
    );
    Ok(())
}
