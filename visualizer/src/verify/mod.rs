//! Structural checks on figure models.
//!
//! Runs after drawing and inspects the figure values the images were drawn
//! from: axis counts, axis labels, tick labels, bar counts and where the
//! heat map annotations sit.

use serde::Serialize;

use crate::config::PipelineOptions;
use crate::models::Field;
use crate::render::figure::annotate;
use crate::render::{CatPlotFigure, HeatMapFigure};
use crate::transform::grouper::{feature_values, split_values, CountRecord};

/// Outcome of one named check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    /// Expected vs found, for failures.
    pub detail: String,
}

impl Check {
    fn equal<T: PartialEq + std::fmt::Debug>(name: &str, expected: T, found: T) -> Self {
        Self {
            name: name.to_string(),
            passed: expected == found,
            detail: format!("expected {:?}, found {:?}", expected, found),
        }
    }

    fn holds(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

/// Pass/fail tally of a verification run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<Check>,
}

impl VerificationReport {
    pub fn extend(&mut self, checks: impl IntoIterator<Item = Check>) {
        self.checks.extend(checks);
    }

    pub fn passed(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.checks.len() - self.passed()
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed)
    }

    pub fn summary(&self) -> String {
        format!(
            "Ran {} checks: {} passed, {} failed",
            self.checks.len(),
            self.passed(),
            self.failed()
        )
    }

    /// Print the summary line and each failing check to stdout.
    pub fn print(&self) {
        println!("{}", self.summary());
        for check in self.failures() {
            println!("FAIL {}: {}", check.name, check.detail);
        }
    }
}

// =============================================================================
// Cat plot
// =============================================================================

/// What a conforming cat plot looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct CatPlotExpectation {
    pub panels: usize,
    pub x_label: String,
    pub y_label: String,
    pub features: Vec<String>,
    pub feature_values: usize,
}

impl CatPlotExpectation {
    /// Derive expectations from the counted data, the resolved feature
    /// columns and the configured labels.
    pub fn from_counts(counts: &[CountRecord], features: &[Field], options: &PipelineOptions) -> Self {
        Self {
            panels: split_values(counts).len(),
            x_label: options.render.cat_plot.x_label.clone(),
            y_label: options.render.cat_plot.y_label.clone(),
            features: features.iter().map(|f| f.name().to_string()).collect(),
            feature_values: feature_values(counts).len(),
        }
    }
}

pub fn verify_cat_plot(figure: &CatPlotFigure, expected: &CatPlotExpectation) -> Vec<Check> {
    let panel_values: Vec<i64> = figure.panels.iter().map(|p| p.split_value).collect();
    let ascending = panel_values.windows(2).all(|w| w[0] < w[1]);

    let mut checks = vec![
        Check::equal("cat plot axes count", expected.panels, figure.axes_count()),
        Check::equal("cat plot x label", expected.x_label.as_str(), figure.x_label.as_str()),
        Check::equal("cat plot y label", expected.y_label.as_str(), figure.y_label.as_str()),
        Check::equal("cat plot tick labels", &expected.features, &figure.features),
        Check::equal(
            "cat plot bar count",
            expected.panels * expected.features.len() * expected.feature_values,
            figure.bar_count(),
        ),
        Check::holds(
            "cat plot panel order",
            ascending,
            format!("split values {:?}", panel_values),
        ),
    ];

    // Bars inside a panel: features in tick order, values ascending.
    let ordered = figure.panels.iter().all(|p| {
        p.bars
            .windows(2)
            .all(|w| (w[0].feature_index, w[0].value) < (w[1].feature_index, w[1].value))
    });
    checks.push(Check::holds("cat plot bar order", ordered, "bars out of order"));

    checks
}

// =============================================================================
// Heat map
// =============================================================================

/// What a conforming heat map looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMapExpectation {
    pub labels: usize,
    pub precision: usize,
    pub colorbar_shrink: f64,
}

impl HeatMapExpectation {
    pub fn from_options(options: &PipelineOptions) -> Self {
        Self {
            labels: Field::NUMERIC.len(),
            precision: options.render.heat_map.annotation_precision,
            colorbar_shrink: options.render.heat_map.colorbar_shrink,
        }
    }
}

pub fn verify_heat_map(figure: &HeatMapFigure, expected: &HeatMapExpectation) -> Vec<Check> {
    let n = figure.labels.len();

    let misplaced: Vec<(usize, usize)> = figure
        .cells
        .iter()
        .filter(|c| c.row <= c.column)
        .map(|c| (c.row, c.column))
        .collect();

    let badly_formatted: Vec<&str> = figure
        .cells
        .iter()
        .filter(|c| c.annotation != annotate(c.value, expected.precision))
        .map(|c| c.annotation.as_str())
        .collect();

    let layout = &figure.layout;
    let bar_target = layout.plot.height as f64 * expected.colorbar_shrink;
    let bar_ok = (layout.colorbar.height as f64 - bar_target).abs() <= 1.0;

    vec![
        Check::equal("heat map axes count", 2, figure.axes_count()),
        Check::equal("heat map label count", expected.labels, n),
        Check::equal("heat map annotation count", n * n.saturating_sub(1) / 2, figure.cells.len()),
        Check::holds(
            "heat map lower triangle",
            misplaced.is_empty(),
            format!("annotations on or above the diagonal at {:?}", misplaced),
        ),
        Check::holds(
            "heat map annotation format",
            badly_formatted.is_empty(),
            format!("not {} decimals: {:?}", expected.precision, badly_formatted),
        ),
        Check::holds(
            "heat map colorbar size",
            bar_ok,
            format!(
                "colorbar {}px for a {}px plot",
                layout.colorbar.height, layout.plot.height
            ),
        ),
    ]
}
