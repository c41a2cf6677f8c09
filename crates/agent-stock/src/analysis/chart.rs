//! PNG price chart rendering

use crate::api::Bar;
use crate::error::{Result, StockError};
use plotters::prelude::*;
use std::path::Path;
use tracing::warn;

/// Chart width in pixels
pub const CHART_WIDTH: u32 = 1200;

/// Chart height in pixels
pub const CHART_HEIGHT: u32 = 800;

const PRICE_PANEL_HEIGHT: u32 = 520;
const ORANGE: RGBColor = RGBColor(255, 140, 0);
const GREY: RGBColor = RGBColor(128, 128, 128);

/// Series drawn on the chart
pub struct ChartData<'a> {
    pub ticker: &'a str,
    pub bars: &'a [Bar],
    pub ma_short: &'a [Option<f64>],
    pub ma_long: &'a [Option<f64>],
}

fn chart_error(e: impl std::fmt::Display) -> StockError {
    StockError::ChartError(e.to_string())
}

/// Render the two-panel chart to `path`
///
/// The upper panel shows the close with its moving averages and the lower
/// panel shows volume bars. When text cannot be drawn (no usable font), the
/// chart is rendered again without captions and axis labels.
pub fn render_chart(path: &Path, data: &ChartData<'_>) -> Result<()> {
    if data.bars.is_empty() {
        return Err(StockError::ChartError("no bars to draw".to_string()));
    }

    match draw(path, data, true) {
        Ok(()) => Ok(()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Labelled chart failed, drawing without text");
            draw(path, data, false)
        }
    }
}

fn price_bounds(data: &ChartData<'_>) -> (f64, f64) {
    let values = data
        .bars
        .iter()
        .map(|b| b.close)
        .chain(data.ma_short.iter().flatten().copied())
        .chain(data.ma_long.iter().flatten().copied())
        .filter(|v| v.is_finite());

    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.05).max(0.01);
    (min - pad, max + pad)
}

fn draw(path: &Path, data: &ChartData<'_>, labelled: bool) -> Result<()> {
    let n = data.bars.len();
    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;
    let (upper, lower) = root.split_vertically(PRICE_PANEL_HEIGHT);

    let (low, high) = price_bounds(data);
    let mut price_builder = ChartBuilder::on(&upper);
    price_builder.margin(12);
    if labelled {
        price_builder
            .caption(format!("{} price", data.ticker), ("sans-serif", 28))
            .x_label_area_size(30)
            .y_label_area_size(70);
    }
    let mut price_chart = price_builder
        .build_cartesian_2d(0..n, low..high)
        .map_err(chart_error)?;

    let date_label = |i: &usize| {
        data.bars
            .get(*i)
            .map(|b| b.timestamp.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    };

    if labelled {
        price_chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .y_desc("Price")
            .draw()
            .map_err(chart_error)?;
    }

    price_chart
        .draw_series(LineSeries::new(
            data.bars.iter().enumerate().map(|(i, b)| (i, b.close)),
            BLUE.stroke_width(2),
        ))
        .map_err(chart_error)?
        .label("Close")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

    for (series, color, label) in [
        (data.ma_short, ORANGE, "50-day MA"),
        (data.ma_long, RED, "200-day MA"),
    ] {
        if series.iter().all(Option::is_none) {
            continue;
        }
        price_chart
            .draw_series(LineSeries::new(
                series
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| v.map(|v| (i, v))),
                color.mix(0.8),
            ))
            .map_err(chart_error)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if labelled {
        price_chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_error)?;
    }

    let max_volume = data.bars.iter().map(|b| b.volume).max().unwrap_or(0).max(1) as f64;
    let mut volume_builder = ChartBuilder::on(&lower);
    volume_builder.margin(12);
    if labelled {
        volume_builder
            .caption("Volume", ("sans-serif", 20))
            .x_label_area_size(30)
            .y_label_area_size(70);
    }
    let mut volume_chart = volume_builder
        .build_cartesian_2d(0..n, 0.0..max_volume * 1.1)
        .map_err(chart_error)?;

    if labelled {
        volume_chart
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&date_label)
            .y_labels(4)
            .y_label_formatter(&|v: &f64| format!("{v:.0}"))
            .draw()
            .map_err(chart_error)?;
    }

    volume_chart
        .draw_series(data.bars.iter().enumerate().map(|(i, b)| {
            Rectangle::new([(i, 0.0), (i + 1, b.volume as f64)], GREY.mix(0.7).filled())
        }))
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    Ok(())
}
