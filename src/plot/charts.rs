use std::fmt::Display;

use plotters::coord::Shift;
use plotters::prelude::*;

use super::{PlotError, Result};
use crate::color::ColorMap;
use crate::stats::{Ccdf, DelayPdf};

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const BAR_WIDTH: f64 = 0.8;
const LEGEND_LINE: i32 = 20;

fn config_err(e: impl Display) -> PlotError {
    PlotError::ChartConfig(e.to_string())
}

fn draw_err(e: impl Display) -> PlotError {
    PlotError::Drawing(e.to_string())
}

fn legend_line(color: ShapeStyle) -> impl Fn((i32, i32)) -> PathElement<(i32, i32)> {
    move |(x, y)| PathElement::new(vec![(x, y), (x + LEGEND_LINE, y)], color)
}

// ---------------------------------------------------------------------------
// Packet length over time
// ---------------------------------------------------------------------------

pub(super) fn draw_packet_length(area: &Area<'_>, series: &[(f64, u32)]) -> Result<()> {
    let Some((t_min, t_max)) = series.iter().fold(None, |acc: Option<(f64, f64)>, &(t, _)| {
        Some(acc.map_or((t, t), |(lo, hi)| (lo.min(t), hi.max(t))))
    }) else {
        return Err(PlotError::InvalidData("no packets to plot".to_string()));
    };
    let y_max = series.iter().map(|&(_, l)| l).max().unwrap_or(0).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(area)
        .caption("Packet Length as a Function of Time", (FONT, 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((t_min - BAR_WIDTH)..(t_max + BAR_WIDTH), 0f64..y_max)
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .x_desc("Time (seconds)")
        .y_desc("Packet Length")
        .label_style((FONT, 16))
        .draw()
        .map_err(draw_err)?;

    let half = BAR_WIDTH / 2.0;
    chart
        .draw_series(series.iter().map(|&(t, len)| {
            Rectangle::new([(t - half, 0.0), (t + half, f64::from(len))], BLUE.filled())
        }))
        .map_err(draw_err)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Inter-packet delay PDF
// ---------------------------------------------------------------------------

pub(super) fn draw_delay_pdf(area: &Area<'_>, pdf: &DelayPdf) -> Result<()> {
    let outline = pdf.histogram.step_outline();
    if outline.is_empty() {
        return Err(PlotError::InvalidData("histogram has no bins".to_string()));
    }

    let x_max = pdf
        .histogram
        .edges
        .last()
        .copied()
        .unwrap_or(0.0)
        .max(pdf.max_delay);
    let y_max = outline
        .iter()
        .chain(&pdf.curve)
        .map(|&(_, y)| y)
        .fold(0.0, f64::max)
        * 1.1;

    let mut chart = ChartBuilder::on(area)
        .caption("Probability Density Function of Inter-Packet Delays", (FONT, 24))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max.max(f64::EPSILON))
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .x_desc("Inter Message Delays (Seconds)")
        .y_desc("Probability Density")
        .label_style((FONT, 16))
        .draw()
        .map_err(draw_err)?;

    let pdf_style = BLUE.stroke_width(2);
    chart
        .draw_series(LineSeries::new(outline, pdf_style))
        .map_err(draw_err)?
        .label("PDF")
        .legend(legend_line(pdf_style));

    let fit_style = RED.mix(0.4).stroke_width(2);
    chart
        .draw_series(LineSeries::new(pdf.curve.iter().copied(), fit_style))
        .map_err(draw_err)?
        .label("exponential distribution")
        .legend(legend_line(fit_style));

    chart
        .configure_series_labels()
        .label_font((FONT, 16))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Combined CCDF
// ---------------------------------------------------------------------------

pub(super) fn draw_ccdf(area: &Area<'_>, series: &[(String, Ccdf)]) -> Result<()> {
    // log axis: zero-length packets cannot be placed
    let x_min = series
        .iter()
        .flat_map(|(_, c)| c.normalized.iter().copied())
        .filter(|&x| x > 0.0)
        .fold(f64::INFINITY, f64::min);
    if !x_min.is_finite() {
        return Err(PlotError::InvalidData("no CCDF points to plot".to_string()));
    }
    let x_min = if x_min >= 1.0 { 0.1 } else { x_min };

    let mut chart = ChartBuilder::on(area)
        .caption("CCDF of Packets Size Distribution", (FONT, 28))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((x_min..1.0).log_scale(), 0f64..1.0)
        .map_err(config_err)?;

    chart
        .configure_mesh()
        .x_desc("Normalized Message Sizes")
        .y_desc("CCDF")
        .x_label_formatter(&|x| format!("{x:.3}"))
        .label_style((FONT, 16))
        .draw()
        .map_err(draw_err)?;

    let labels: Vec<&str> = series.iter().map(|(label, _)| label.as_str()).collect();
    let colors = ColorMap::new(&labels);

    for (label, ccdf) in series {
        let style = colors.color_for(label).stroke_width(2);
        chart
            .draw_series(LineSeries::new(
                ccdf.points().filter(|&(x, _)| x > 0.0),
                style,
            ))
            .map_err(draw_err)?
            .label(label.as_str())
            .legend(legend_line(style));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .label_font((FONT, 16))
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    Ok(())
}
