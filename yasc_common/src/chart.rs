//! Min/max normalisation of price series into chart coordinates.
//!
//! Coordinates are percentages: `x` runs from 0 to `width` across the kept
//! samples, `y` is 100 at the lowest price and `100 - height_percent` at the
//! highest, shifted down by `padding_percent`. Higher prices plot nearer the
//! top.

use serde::Serialize;

use crate::config::{FULL_CHART_POINTS, SPARKLINE_POINTS};
use crate::error::NoDataAvailable;

/// Stroke colour of a series that ended at or above where it started.
pub const INCREASE_COLOR: &str = "#4caf50";
/// Stroke colour of a series that ended below where it started.
pub const DECREASE_COLOR: &str = "#f44336";

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Layout parameters for [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    /// Width of the x axis.
    pub width: f64,
    /// Share of the height the price range spans.
    pub height_percent: f64,
    /// Offset added to every `y`.
    pub padding_percent: f64,
    /// Trailing samples kept.
    pub max_points: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        ChartOptions {
            width: 100.0,
            height_percent: 100.0,
            padding_percent: 0.0,
            max_points: FULL_CHART_POINTS,
        }
    }
}

impl ChartOptions {
    /// Options for the small sparkline variant.
    pub fn sparkline() -> Self {
        ChartOptions {
            max_points: SPARKLINE_POINTS,
            ..ChartOptions::default()
        }
    }

    /// Same options keeping `max_points` trailing samples.
    pub fn with_max_points(self, max_points: usize) -> Self {
        ChartOptions { max_points, ..self }
    }
}

/// Direction of a series, judged by its endpoints only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    /// Last sample >= first sample.
    Increase,
    /// Last sample < first sample.
    Decrease,
}

impl Trend {
    /// Trend between two endpoint values.
    pub fn between(first: f64, last: f64) -> Trend {
        if last >= first {
            Trend::Increase
        } else {
            Trend::Decrease
        }
    }

    /// Stroke colour for this trend.
    pub fn color(self) -> &'static str {
        match self {
            Trend::Increase => INCREASE_COLOR,
            Trend::Decrease => DECREASE_COLOR,
        }
    }
}

/// One chart coordinate.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
}

/// Normalised chart of a price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLine {
    /// Coordinates in sample order.
    pub points: Vec<ChartPoint>,
    /// Endpoint trend.
    pub trend: Trend,
    /// Lowest kept sample.
    pub min: f64,
    /// Highest kept sample.
    pub max: f64,
    #[serde(skip)]
    samples: Vec<f64>,
}

impl ChartLine {
    /// Points as an SVG polyline `points` attribute: `"x,y x,y ..."`.
    pub fn svg_points(&self) -> String {
        self.points
            .iter()
            .map(|p| format!("{},{}", p.x, p.y))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One block character per sample, low to high.
    pub fn sparkline(&self) -> String {
        let range = range_or_one(self.min, self.max);
        let top = (SPARK_LEVELS.len() - 1) as f64;
        self.samples
            .iter()
            .map(|s| {
                let level = (((s - self.min) / range) * top).round() as usize;
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            })
            .collect()
    }
}

fn range_or_one(min: f64, max: f64) -> f64 {
    let range = max - min;
    if range == 0.0 { 1.0 } else { range }
}

/// Normalise `samples` into chart coordinates.
///
/// Missing and non-finite samples are dropped first; only the last
/// `options.max_points` of the rest are kept. Returns [`NoDataAvailable`]
/// when nothing is left.
pub fn normalize(samples: &[Option<f64>], options: &ChartOptions) -> Result<ChartLine, NoDataAvailable> {
    let valid: Vec<f64> = samples
        .iter()
        .flatten()
        .copied()
        .filter(|s| s.is_finite())
        .collect();
    let keep = options.max_points.max(1);
    let kept = &valid[valid.len().saturating_sub(keep)..];

    let (first, last) = match (kept.first(), kept.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(NoDataAvailable),
    };
    let min = kept.iter().copied().fold(f64::INFINITY, f64::min);
    let max = kept.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = range_or_one(min, max);
    let count = kept.len();

    let points = kept
        .iter()
        .enumerate()
        .map(|(i, sample)| {
            let x = if count == 1 {
                0.0
            } else {
                i as f64 / (count - 1) as f64 * options.width
            };
            let y = 100.0 - ((sample - min) / range) * options.height_percent
                + options.padding_percent;
            ChartPoint { x, y }
        })
        .collect();

    Ok(ChartLine {
        points,
        trend: Trend::between(first, last),
        min,
        max,
        samples: kept.to_vec(),
    })
}
