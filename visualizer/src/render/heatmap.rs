//! Lower-triangle correlation heat map with a half-height colorbar.
//!
//! Cells are drawn straight onto the canvas from [`HeatMapLayout`] pixel
//! geometry; masked cells are left blank.
//!
//! [`HeatMapLayout`]: super::figure::HeatMapLayout

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::path::Path;

use super::figure::HeatMapFigure;
use super::{diverging, ensure_parent, rgb, text_color_on};
use crate::config::HeatMapStyle;
use crate::error::{RenderError, RenderResult};

const COLORBAR_STEPS: i32 = 100;

/// Fill color of a coefficient, `None` for NaN.
pub fn cell_color(value: f64, style: &HeatMapStyle) -> Option<[u8; 3]> {
    style
        .scale
        .position(value)
        .map(|t| diverging(style.low_color, style.mid_color, style.high_color, t))
}

/// Draw `figure` to `path`.
pub fn draw_heat_map(figure: &HeatMapFigure, style: &HeatMapStyle, path: &Path) -> RenderResult<()> {
    ensure_parent(path)?;

    let layout = &figure.layout;
    let root = BitMapBackend::new(path, (layout.size, layout.size)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::drawing)?;

    let n = figure.labels.len();
    let cell = layout.cell_size(n);
    let gap = style.line_width as i32;
    let plot = layout.plot;

    let annotation_size = (cell / 3).clamp(8, 16);
    for c in &figure.cells {
        let x0 = plot.x + c.column as i32 * cell;
        let y0 = plot.y + c.row as i32 * cell;

        let Some(fill) = cell_color(c.value, style) else {
            // NaN: keep the cell blank, annotation only
            root.draw(&Text::new(
                c.annotation.clone(),
                (x0 + cell / 2, y0 + cell / 2),
                ("sans-serif", annotation_size)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center)),
            ))
            .map_err(RenderError::drawing)?;
            continue;
        };

        root.draw(&Rectangle::new(
            [(x0 + gap, y0 + gap), (x0 + cell - gap, y0 + cell - gap)],
            rgb(fill).filled(),
        ))
        .map_err(RenderError::drawing)?;

        root.draw(&Text::new(
            c.annotation.clone(),
            (x0 + cell / 2, y0 + cell / 2),
            ("sans-serif", annotation_size)
                .into_font()
                .color(&text_color_on(fill))
                .pos(Pos::new(HPos::Center, VPos::Center)),
        ))
        .map_err(RenderError::drawing)?;
    }

    // Row labels on the left, column labels underneath (rotated).
    for (i, label) in figure.labels.iter().enumerate() {
        let mid = i as i32 * cell + cell / 2;
        root.draw(&Text::new(
            label.clone(),
            (plot.x - 8, plot.y + mid),
            ("sans-serif", 14)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Right, VPos::Center)),
        ))
        .map_err(RenderError::drawing)?;
        root.draw(&Text::new(
            label.clone(),
            (plot.x + mid, plot.bottom() + 8),
            ("sans-serif", 14)
                .into_font()
                .transform(FontTransform::Rotate90)
                .color(&BLACK),
        ))
        .map_err(RenderError::drawing)?;
    }

    draw_colorbar(&root, figure, style)?;

    root.present().map_err(RenderError::drawing)?;
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    figure: &HeatMapFigure,
    style: &HeatMapStyle,
) -> RenderResult<()> {
    let bar = figure.layout.colorbar;
    if bar.height <= 0 {
        return Ok(());
    }

    let scale = &figure.scale;
    let step = bar.height as f64 / COLORBAR_STEPS as f64;
    for i in 0..COLORBAR_STEPS {
        // Top of the bar is vmax
        let value = scale.vmax - (scale.vmax - scale.vmin) * (i as f64 + 0.5) / COLORBAR_STEPS as f64;
        let color = cell_color(value, style).unwrap_or([255, 255, 255]);
        let y0 = bar.y + (i as f64 * step) as i32;
        let y1 = bar.y + ((i + 1) as f64 * step).ceil() as i32;
        root.draw(&Rectangle::new(
            [(bar.x, y0), (bar.right(), y1.min(bar.bottom()))],
            rgb(color).filled(),
        ))
        .map_err(RenderError::drawing)?;
    }

    root.draw(&Rectangle::new(
        [(bar.x, bar.y), (bar.right(), bar.bottom())],
        BLACK.stroke_width(1),
    ))
    .map_err(RenderError::drawing)?;

    let mut ticks = vec![(scale.vmax, bar.y), (scale.vmin, bar.bottom())];
    if let Some(center) = scale.center {
        if center > scale.vmin && center < scale.vmax {
            let frac = (scale.vmax - center) / (scale.vmax - scale.vmin);
            ticks.push((center, bar.y + (frac * bar.height as f64) as i32));
        }
    }
    for (value, y) in ticks {
        root.draw(&Text::new(
            format!("{:.*}", figure.precision, value),
            (bar.right() + 6, y),
            ("sans-serif", 12)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Left, VPos::Center)),
        ))
        .map_err(RenderError::drawing)?;
    }

    Ok(())
}
