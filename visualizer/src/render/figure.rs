//! Inspectable figure models.
//!
//! Each chart is described here first (panels, bars, labels, annotated cells,
//! pixel layout) and only then drawn. The verification hook works on these
//! values, not on pixels.

use serde::Serialize;

use crate::config::{CatPlotStyle, ColorScale, HeatMapStyle};
use crate::models::Field;
use crate::transform::correlation::MaskedMatrix;
use crate::transform::grouper::{feature_values, split_values, CountRecord};

// =============================================================================
// Cat plot
// =============================================================================

/// One bar: the count of a (feature, value) pair inside a panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub feature: String,
    /// Position of the feature on the x axis.
    pub feature_index: usize,
    pub value: i64,
    /// Rank of `value` among all feature values; selects the color.
    pub hue_index: usize,
    pub total: usize,
}

/// One panel (axis) per split value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatPanel {
    pub title: String,
    pub split_value: i64,
    pub bars: Vec<Bar>,
}

/// Grouped bar chart, one panel per split value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatPlotFigure {
    pub width: u32,
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
    pub hue_label: String,
    /// X tick labels, in display order.
    pub features: Vec<String>,
    /// Legend entries, ascending.
    pub hue_values: Vec<i64>,
    pub panels: Vec<CatPanel>,
}

impl CatPlotFigure {
    pub fn axes_count(&self) -> usize {
        self.panels.len()
    }

    pub fn bar_count(&self) -> usize {
        self.panels.iter().map(|p| p.bars.len()).sum()
    }

    pub fn max_total(&self) -> usize {
        self.panels
            .iter()
            .flat_map(|p| p.bars.iter())
            .map(|b| b.total)
            .max()
            .unwrap_or(0)
    }
}

/// Lay out counted records as a grouped bar chart.
///
/// Every panel gets a bar for every (feature, value) combination; missing
/// combinations are drawn with a total of 0 so panels stay aligned.
pub fn build_cat_plot(
    counts: &[CountRecord],
    split: Field,
    features: &[Field],
    style: &CatPlotStyle,
) -> CatPlotFigure {
    let hue_values = feature_values(counts);

    let panels = split_values(counts)
        .into_iter()
        .map(|split_value| {
            let mut bars = Vec::with_capacity(features.len() * hue_values.len());
            for (feature_index, feature) in features.iter().enumerate() {
                for (hue_index, &value) in hue_values.iter().enumerate() {
                    let total = counts
                        .iter()
                        .find(|c| c.split == split_value && c.feature == *feature && c.value == value)
                        .map(|c| c.total)
                        .unwrap_or(0);
                    bars.push(Bar {
                        feature: feature.name().to_string(),
                        feature_index,
                        value,
                        hue_index,
                        total,
                    });
                }
            }
            CatPanel {
                title: format!("{} = {}", split.name(), split_value),
                split_value,
                bars,
            }
        })
        .collect();

    CatPlotFigure {
        width: style.width,
        height: style.height,
        x_label: style.x_label.clone(),
        y_label: style.y_label.clone(),
        hue_label: style.hue_label.clone(),
        features: features.iter().map(|f| f.name().to_string()).collect(),
        hue_values,
        panels,
    }
}

// =============================================================================
// Heat map
// =============================================================================

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Where the cell grid and the colorbar go on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatMapLayout {
    pub size: u32,
    pub plot: PixelRect,
    pub colorbar: PixelRect,
}

const LABEL_MARGIN: i32 = 130;
const TOP_MARGIN: i32 = 40;
const COLORBAR_GAP: i32 = 30;
const COLORBAR_WIDTH: i32 = 24;
const COLORBAR_AREA: i32 = 110;

impl HeatMapLayout {
    /// Square grid of `n × n` cells with the colorbar on its right.
    pub fn new(size: u32, n: usize, colorbar_shrink: f64) -> Self {
        let side = size as i32;
        let room = (side - LABEL_MARGIN - COLORBAR_AREA).min(side - LABEL_MARGIN - TOP_MARGIN);
        let n = n.max(1) as i32;
        // Whole-pixel cells
        let grid = (room.max(n) / n) * n;

        let plot = PixelRect {
            x: LABEL_MARGIN,
            y: TOP_MARGIN,
            width: grid,
            height: grid,
        };

        let bar_height = (grid as f64 * colorbar_shrink.clamp(0.0, 1.0)).round() as i32;
        let colorbar = PixelRect {
            x: plot.right() + COLORBAR_GAP,
            y: plot.y + (grid - bar_height) / 2,
            width: COLORBAR_WIDTH,
            height: bar_height,
        };

        Self { size, plot, colorbar }
    }

    pub fn cell_size(&self, n: usize) -> i32 {
        self.plot.width / n.max(1) as i32
    }
}

/// One drawn (unmasked) cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub row: usize,
    pub column: usize,
    pub value: f64,
    pub annotation: String,
}

/// Annotated lower-triangle heat map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatMapFigure {
    pub labels: Vec<String>,
    pub cells: Vec<HeatCell>,
    pub scale: ColorScale,
    pub precision: usize,
    pub colorbar_shrink: f64,
    pub layout: HeatMapLayout,
}

impl HeatMapFigure {
    /// Main grid plus colorbar.
    pub fn axes_count(&self) -> usize {
        2
    }

    pub fn annotations(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.annotation.as_str()).collect()
    }
}

/// Format a coefficient the way cells are annotated.
pub fn annotate(value: f64, precision: usize) -> String {
    format!("{:.*}", precision, value)
}

/// Lay out the retained cells of a masked matrix.
pub fn build_heat_map(masked: &MaskedMatrix, style: &HeatMapStyle) -> HeatMapFigure {
    let cells = masked
        .cells
        .indexed_iter()
        .filter_map(|((row, column), v)| {
            v.as_ref().map(|&value| HeatCell {
                row,
                column,
                value,
                annotation: annotate(value, style.annotation_precision),
            })
        })
        .collect();

    HeatMapFigure {
        labels: masked.labels.clone(),
        cells,
        scale: style.scale,
        precision: style.annotation_precision,
        colorbar_shrink: style.colorbar_shrink,
        layout: HeatMapLayout::new(style.size, masked.len(), style.colorbar_shrink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::correlation::CorrelationMatrix;

    fn count(split: i64, feature: Field, value: i64, total: usize) -> CountRecord {
        CountRecord { split, feature, value, total }
    }

    #[test]
    fn test_cat_plot_panels_and_bars() {
        let counts = vec![
            count(0, Field::Smoke, 0, 5),
            count(0, Field::Smoke, 1, 2),
            count(0, Field::Alco, 0, 7),
            count(1, Field::Smoke, 0, 3),
            count(1, Field::Smoke, 1, 1),
            count(1, Field::Alco, 0, 3),
            count(1, Field::Alco, 1, 1),
        ];
        let fig = build_cat_plot(&counts, Field::Cardio, &[Field::Smoke, Field::Alco], &CatPlotStyle::default());

        assert_eq!(fig.axes_count(), 2);
        assert_eq!(fig.bar_count(), 2 * 2 * 2);
        assert_eq!(fig.panels[0].title, "cardio = 0");
        assert_eq!(fig.features, vec!["smoke", "alco"]);
        assert_eq!(fig.max_total(), 7);

        // alco=1 never occurs with cardio=0: present with zero height
        let missing = &fig.panels[0].bars[3];
        assert_eq!((missing.feature.as_str(), missing.value, missing.total), ("alco", 1, 0));
    }

    #[test]
    fn test_cat_plot_bar_order() {
        let counts = vec![count(0, Field::Gluc, 1, 1), count(0, Field::Gluc, 0, 4)];
        let fig = build_cat_plot(&counts, Field::Cardio, &[Field::Gluc], &CatPlotStyle::default());
        let values: Vec<i64> = fig.panels[0].bars.iter().map(|b| b.value).collect();
        assert_eq!(values, vec![0, 1]);
    }

    #[test]
    fn test_layout_colorbar_half_height() {
        let layout = HeatMapLayout::new(1200, 14, 0.5);
        assert_eq!(layout.plot.width, layout.plot.height);
        assert_eq!(layout.plot.width % 14, 0);
        assert!((layout.colorbar.height * 2 - layout.plot.height).abs() <= 1);
        assert!(layout.colorbar.right() <= 1200);
        assert!(layout.plot.bottom() <= 1200);
    }

    #[test]
    fn test_heat_map_annotations() {
        let m = CorrelationMatrix::compute(
            vec!["a".into(), "b".into(), "c".into()],
            &[vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.5], vec![3.0, 1.0, 2.0]],
        );
        let fig = build_heat_map(&m.masked(), &HeatMapStyle::default());

        assert_eq!(fig.cells.len(), 3);
        assert!(fig.cells.iter().all(|c| c.row > c.column));
        assert!(fig.annotations().iter().all(|a| a.split('.').nth(1).map(str::len) == Some(2)));
    }

    #[test]
    fn test_annotate_precision() {
        assert_eq!(annotate(0.123456, 2), "0.12");
        assert_eq!(annotate(-0.4567, 2), "-0.46");
        assert_eq!(annotate(1.0, 2), "1.00");
    }
}
