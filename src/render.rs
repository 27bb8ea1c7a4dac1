//! PNG rendering of the temperature overlay chart.
//!
//! Charts are drawn with the [`plotters`] bitmap backend: the full series as a
//! connected line with markers and the selected subset as isolated markers in
//! a contrasting colour.

use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;

use crate::color::SeriesColors;
use crate::data::filter::FilteredTemperatures;
use crate::data::model::TemperatureRecord;

/// Matches an 8x4 inch figure at 100 dpi.
pub const CHART_SIZE: (u32, u32) = (800, 400);

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Everything needed to draw one overlay chart.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayChart {
    pub title: String,
    /// Full series as `(time, temperature)`.
    pub all: Vec<(f64, f64)>,
    /// Selected subset as `(time, temperature)`.
    pub selected: Vec<(f64, f64)>,
}

impl OverlayChart {
    pub fn new(entry_name: &str, filtered: &FilteredTemperatures) -> Self {
        let points = |records: &[TemperatureRecord]| -> Vec<(f64, f64)> {
            records
                .iter()
                .map(|r| (r.time, r.temperature))
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect()
        };
        OverlayChart {
            title: format!("Temperature vs Time - {entry_name}"),
            all: points(&filtered.all),
            selected: points(&filtered.selected),
        }
    }

    /// Axis ranges over both series, widened when degenerate. A chart with
    /// no finite points gets the unit square so it can still be drawn.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let mut points = self.all.iter().chain(self.selected.iter()).peekable();
        if points.peek().is_none() {
            return ((0.0, 1.0), (0.0, 1.0));
        }

        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        (pad_range(x_min, x_max), pad_range(y_min, y_max))
    }
}

fn pad_range(min: f64, max: f64) -> (f64, f64) {
    if max - min < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

/// Writes an [`OverlayChart`] to an image file.
pub trait ChartRenderer {
    fn render(&self, chart: &OverlayChart, output_path: &Path) -> Result<()>;
}

/// Renders charts to PNG with the plotters bitmap backend.
#[derive(Debug, Clone, Default)]
pub struct PngRenderer {
    pub colors: SeriesColors,
}

impl ChartRenderer for PngRenderer {
    fn render(&self, chart: &OverlayChart, output_path: &Path) -> Result<()> {
        let ((x_min, x_max), (y_min, y_max)) = chart.bounds();

        let root = BitMapBackend::new(output_path, CHART_SIZE);
        let drawing_area = root.into_drawing_area();

        drawing_area
            .fill(&WHITE)
            .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

        let mut chart_context = ChartBuilder::on(&drawing_area)
            .caption(&chart.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

        chart_context
            .configure_mesh()
            .x_desc("Time")
            .y_desc("Temperature")
            .label_style(("sans-serif", 14))
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let full = rgb(self.colors.full);
        let selected = rgb(self.colors.selected);

        chart_context
            .draw_series(
                LineSeries::new(chart.all.iter().copied(), full.stroke_width(2)).point_size(3),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label("All Data")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], full));

        chart_context
            .draw_series(
                chart
                    .selected
                    .iter()
                    .map(|&point| Circle::new(point, 4, selected.filled())),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label("Filtered Points")
            .legend(move |(x, y)| Circle::new((x + 10, y), 4, selected.filled()));

        chart_context
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        drawing_area
            .present()
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        Ok(())
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filtered(all: &[(f64, f64)], selected: &[(f64, f64)]) -> FilteredTemperatures {
        let records = |pts: &[(f64, f64)]| -> Vec<TemperatureRecord> {
            pts.iter()
                .map(|&(time, temperature)| TemperatureRecord { time, temperature })
                .collect()
        };
        FilteredTemperatures {
            all: records(all),
            selected: records(selected),
        }
    }

    #[test]
    fn test_chart_title_and_points() {
        let chart = OverlayChart::new(
            "run/temperature.xlsx",
            &filtered(&[(1.0, 5.0), (2.0, f64::NAN)], &[(1.0, 5.0)]),
        );
        assert_eq!(chart.title, "Temperature vs Time - run/temperature.xlsx");
        assert_eq!(chart.all, vec![(1.0, 5.0)]);
        assert_eq!(chart.selected, vec![(1.0, 5.0)]);
    }

    #[test]
    fn test_single_point_bounds_are_widened() {
        let chart = OverlayChart::new("t.csv", &filtered(&[(3.0, 7.0)], &[]));
        assert_eq!(chart.bounds(), ((2.0, 4.0), (6.0, 8.0)));
    }

    #[test]
    fn test_chart_without_finite_points_uses_unit_bounds() {
        let chart = OverlayChart::new("t.csv", &filtered(&[(1.0, f64::NAN)], &[(1.0, f64::NAN)]));
        assert!(chart.all.is_empty());
        assert_eq!(chart.bounds(), ((0.0, 1.0), (0.0, 1.0)));
    }

    #[cfg(feature = "render-tests")]
    #[test]
    fn test_png_renderer_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("temperature.png");
        let chart = OverlayChart::new(
            "temperature.csv",
            &filtered(&[(1.0, 5.0), (2.0, 25.0), (3.0, 12.0)], &[(1.0, 5.0)]),
        );

        PngRenderer::default().render(&chart, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }
}
