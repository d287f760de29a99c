//! Grouped bar chart: one panel per split value, bars grouped by feature and
//! colored by feature value.

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

use super::figure::CatPlotFigure;
use super::{ensure_parent, rgb};
use crate::config::CatPlotStyle;
use crate::error::{RenderError, RenderResult};

/// Share of a feature slot covered by its bars.
const GROUP_WIDTH: f64 = 0.8;

const LEGEND_WIDTH: u32 = 120;

/// Draw `figure` to `path`.
pub fn draw_cat_plot(figure: &CatPlotFigure, style: &CatPlotStyle, path: &Path) -> RenderResult<()> {
    ensure_parent(path)?;

    let root = BitMapBackend::new(path, (figure.width, figure.height)).into_drawing_area();
    root.fill(&WHITE).map_err(RenderError::drawing)?;

    let (plots, legend) = root.split_horizontally(figure.width.saturating_sub(LEGEND_WIDTH));
    let areas = plots.split_evenly((1, figure.panels.len().max(1)));

    let n_features = figure.features.len().max(1) as f64;
    let n_hues = figure.hue_values.len().max(1) as f64;
    let bar_width = GROUP_WIDTH / n_hues;
    // Shared y scale so panels compare
    let y_max = (figure.max_total() as f64 * 1.1).max(1.0);

    for (area, panel) in areas.iter().zip(&figure.panels) {
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..n_features, 0f64..y_max)
            .map_err(RenderError::drawing)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_label_formatter(&|_| String::new())
            .x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .draw()
            .map_err(RenderError::drawing)?;

        chart
            .draw_series(panel.bars.iter().map(|bar| {
                let x0 = bar.feature_index as f64 + (1.0 - GROUP_WIDTH) / 2.0 + bar.hue_index as f64 * bar_width;
                Rectangle::new(
                    [(x0, 0.0), (x0 + bar_width, bar.total as f64)],
                    rgb(style.color(bar.hue_index)).filled(),
                )
            }))
            .map_err(RenderError::drawing)?;

        // Feature names under each group, placed in backend pixels.
        let tick_font = ("sans-serif", 14)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        for (i, name) in figure.features.iter().enumerate() {
            let (x, y) = chart.backend_coord(&(i as f64 + 0.5, 0.0));
            root.draw(&Text::new(name.clone(), (x, y + 6), tick_font.clone()))
                .map_err(RenderError::drawing)?;
        }
    }

    draw_legend(&legend, figure, style)?;

    root.present().map_err(RenderError::drawing)?;
    Ok(())
}

fn draw_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    figure: &CatPlotFigure,
    style: &CatPlotStyle,
) -> RenderResult<()> {
    let top = (figure.height / 2) as i32 - 20 * figure.hue_values.len() as i32 / 2;

    area.draw(&Text::new(
        figure.hue_label.clone(),
        (10, top - 24),
        ("sans-serif", 16).into_font().color(&BLACK),
    ))
    .map_err(RenderError::drawing)?;

    for (rank, value) in figure.hue_values.iter().enumerate() {
        let y = top + rank as i32 * 20;
        area.draw(&Rectangle::new(
            [(10, y), (24, y + 14)],
            rgb(style.color(rank)).filled(),
        ))
        .map_err(RenderError::drawing)?;
        area.draw(&Text::new(
            value.to_string(),
            (32, y),
            ("sans-serif", 14).into_font().color(&BLACK),
        ))
        .map_err(RenderError::drawing)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;
    use crate::render::figure::build_cat_plot;
    use crate::transform::grouper::CountRecord;

    #[test]
    fn test_draw_writes_png() {
        let counts = vec![
            CountRecord { split: 0, feature: Field::Smoke, value: 0, total: 4 },
            CountRecord { split: 0, feature: Field::Smoke, value: 1, total: 1 },
            CountRecord { split: 1, feature: Field::Smoke, value: 0, total: 2 },
        ];
        let style = CatPlotStyle::default();
        let figure = build_cat_plot(&counts, Field::Cardio, &[Field::Smoke], &style);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catplot.png");
        draw_cat_plot(&figure, &style, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }
}
