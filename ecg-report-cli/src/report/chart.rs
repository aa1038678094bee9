//! Per-lead time-series panels
//!
//! Each lead becomes one fixed-size SVG line chart. All panels share the
//! table's time range on the x axis so they line up when stacked.

use super::{RenderError, Result};
use ecg_record::WaveColumn;
use plotters::prelude::*;

/// Panel geometry; the page stylesheet scales panels to the page width
const PANEL_WIDTH: u32 = 1200;
const PANEL_HEIGHT: u32 = 200;

/// Draw one lead as an SVG string
///
/// Rows holding the NaN padding marker are skipped, so ragged leads simply
/// end early instead of corrupting the path data.
pub fn lead_panel(column: &WaveColumn, time: &[f64], time_span: f64) -> Result<String> {
    let mut svg = String::new();

    {
        let root =
            SVGBackend::with_string(&mut svg, (PANEL_WIDTH, PANEL_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| chart_error(column.name(), e))?;

        let points: Vec<(f64, f64)> = time
            .iter()
            .zip(column.values())
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .map(|(t, v)| (*t, *v))
            .collect();

        let (y_min, y_max) = value_range(&points);
        let x_max = if time_span.is_finite() && time_span > 0.0 {
            time_span
        } else {
            1.0
        };

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Lead {}", column.name()), ("sans-serif", 16))
            .margin(5)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(0f64..x_max, y_min..y_max)
            .map_err(|e| chart_error(column.name(), e))?;

        chart
            .configure_mesh()
            .x_desc("time (s)")
            .y_desc("V (mV)")
            .draw()
            .map_err(|e| chart_error(column.name(), e))?;

        chart
            .draw_series(LineSeries::new(points, &BLUE))
            .map_err(|e| chart_error(column.name(), e))?;

        root.present().map_err(|e| chart_error(column.name(), e))?;
    }

    Ok(svg)
}

fn chart_error<E: std::fmt::Display>(lead: &str, err: E) -> RenderError {
    RenderError::Chart {
        lead: lead.to_string(),
        message: err.to_string(),
    }
}

/// Fit the y range to the finite samples
///
/// A constant series is widened so the backend always receives a non-empty
/// range; a series with no finite samples falls back to the unit range.
fn value_range(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for (_, v) in points {
        min = min.min(*v);
        max = max.max(*v);
    }

    if min > max {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 0.5, max + 0.5);
    }
    (min, max)
}
