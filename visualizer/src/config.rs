//! Pipeline configuration.
//!
//! All styling and thresholds live here and are passed explicitly to the
//! stages that need them. A JSON file may override any subset of fields;
//! `MEDVIZ_DATA` and `MEDVIZ_OUT_DIR` override the paths.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigResult;

/// Default input file, relative to the working directory.
pub const DEFAULT_INPUT: &str = "medical_examination.csv";

/// Env var overriding [`PipelineOptions::input`].
pub const ENV_DATA: &str = "MEDVIZ_DATA";

/// Env var overriding [`PipelineOptions::out_dir`].
pub const ENV_OUT_DIR: &str = "MEDVIZ_OUT_DIR";

// =============================================================================
// BMI rule
// =============================================================================

/// Threshold rule deriving the `overweight` flag.
///
/// `bmi = weight / (height / height_divisor)²`, flagged when `bmi > cutoff`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BmiRule {
    pub cutoff: f64,
    /// Converts the height column to metres.
    pub height_divisor: f64,
}

impl Default for BmiRule {
    fn default() -> Self {
        Self {
            cutoff: 25.0,
            height_divisor: 100.0,
        }
    }
}

impl BmiRule {
    pub fn bmi(&self, weight: f64, height: f64) -> f64 {
        let metres = height / self.height_divisor;
        weight / (metres * metres)
    }

    pub fn is_overweight(&self, weight: f64, height: f64) -> bool {
        self.bmi(weight, height) > self.cutoff
    }
}

// =============================================================================
// Render styling
// =============================================================================

/// Styling of the grouped bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatPlotStyle {
    pub width: u32,
    pub height: u32,
    pub x_label: String,
    pub y_label: String,
    /// Legend title for the bar colors.
    pub hue_label: String,
    /// Bar colors, indexed by feature-value rank.
    pub palette: Vec<[u8; 3]>,
}

impl Default for CatPlotStyle {
    fn default() -> Self {
        Self {
            width: 1400,
            height: 600,
            x_label: "variable".to_string(),
            y_label: "total".to_string(),
            hue_label: "value".to_string(),
            palette: vec![[49, 115, 161], [225, 129, 44], [58, 146, 58], [192, 61, 62]],
        }
    }
}

impl CatPlotStyle {
    pub fn color(&self, rank: usize) -> [u8; 3] {
        if self.palette.is_empty() {
            return [128, 128, 128];
        }
        self.palette[rank % self.palette.len()]
    }
}

/// Fixed color scale of the heat map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScale {
    pub vmin: f64,
    pub vmax: f64,
    /// Value mapped to the middle color; `None` spreads linearly.
    pub center: Option<f64>,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            vmin: -0.1,
            vmax: 0.25,
            center: Some(0.0),
        }
    }
}

impl ColorScale {
    /// Position of `value` on the scale, in [0, 1]. `None` for NaN.
    pub fn position(&self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        let v = value.clamp(self.vmin, self.vmax);
        let t = match self.center {
            Some(c) if c > self.vmin && c < self.vmax => {
                if v < c {
                    0.5 * (v - self.vmin) / (c - self.vmin)
                } else {
                    0.5 + 0.5 * (v - c) / (self.vmax - c)
                }
            }
            _ if self.vmax > self.vmin => (v - self.vmin) / (self.vmax - self.vmin),
            _ => 0.5,
        };
        Some(t.clamp(0.0, 1.0))
    }
}

/// Styling of the correlation heat map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatMapStyle {
    /// Square canvas side, in pixels.
    pub size: u32,
    pub scale: ColorScale,
    /// Decimal places of the cell annotations.
    pub annotation_precision: usize,
    /// Colorbar height as a fraction of the plot height.
    pub colorbar_shrink: f64,
    /// Gap between cells, in pixels.
    pub line_width: u32,
    pub low_color: [u8; 3],
    pub mid_color: [u8; 3],
    pub high_color: [u8; 3],
}

impl Default for HeatMapStyle {
    fn default() -> Self {
        Self {
            size: 1200,
            scale: ColorScale::default(),
            annotation_precision: 2,
            colorbar_shrink: 0.5,
            line_width: 1,
            low_color: [59, 76, 192],
            mid_color: [24, 24, 32],
            high_color: [236, 96, 60],
        }
    }
}

/// Explicit styling for both renderers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub cat_plot: CatPlotStyle,
    pub heat_map: HeatMapStyle,
}

// =============================================================================
// Pipeline options
// =============================================================================

/// Options for a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub input: PathBuf,
    pub out_dir: PathBuf,
    pub cat_plot_file: String,
    pub heat_map_file: String,

    /// Binary column partitioning the cat plot into panels.
    pub split: String,

    /// Cat plot features, in display order.
    pub features: Vec<String>,

    pub bmi: BmiRule,

    /// Collapse `cholesterol`/`gluc` codes to 0 (normal) / 1 (above normal).
    pub normalize_ordinals: bool,

    /// Drop implausible pressure readings and height/weight outliers
    /// before correlating.
    pub clean_heat_map: bool,

    /// Run the figure checks after drawing.
    pub verify: bool,

    pub render: RenderConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            out_dir: PathBuf::from("."),
            cat_plot_file: "catplot.png".to_string(),
            heat_map_file: "heatmap.png".to_string(),
            split: "cardio".to_string(),
            features: ["cholesterol", "gluc", "smoke", "alco", "active", "overweight"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bmi: BmiRule::default(),
            normalize_ordinals: true,
            clean_heat_map: true,
            verify: true,
            render: RenderConfig::default(),
        }
    }
}

impl PipelineOptions {
    /// Read options from a JSON file; absent fields keep their defaults.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Apply `MEDVIZ_DATA` / `MEDVIZ_OUT_DIR` when set.
    pub fn apply_env(&mut self) {
        if let Ok(path) = std::env::var(ENV_DATA) {
            if !path.trim().is_empty() {
                self.input = PathBuf::from(path);
            }
        }
        if let Ok(dir) = std::env::var(ENV_OUT_DIR) {
            if !dir.trim().is_empty() {
                self.out_dir = PathBuf::from(dir);
            }
        }
    }

    pub fn cat_plot_path(&self) -> PathBuf {
        self.out_dir.join(&self.cat_plot_file)
    }

    pub fn heat_map_path(&self) -> PathBuf {
        self.out_dir.join(&self.heat_map_file)
    }
}
