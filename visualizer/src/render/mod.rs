//! Chart rendering.
//!
//! - [`figure`] - Inspectable figure models built from transformed data
//! - [`catplot`] - Grouped bar chart drawing
//! - [`heatmap`] - Annotated correlation heat map drawing
//!
//! Drawing goes through `plotters`' bitmap backend; the output format follows
//! the file extension (PNG by default).

pub mod catplot;
pub mod figure;
pub mod heatmap;

use plotters::style::RGBColor;
use std::path::Path;

use crate::error::RenderResult;

pub use catplot::draw_cat_plot;
pub use figure::{build_cat_plot, build_heat_map, CatPlotFigure, HeatMapFigure};
pub use heatmap::draw_heat_map;

/// Linear blend of two colors, `t` in [0, 1].
pub fn lerp_rgb(a: [u8; 3], b: [u8; 3], t: f64) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    [mix(a[0], b[0]), mix(a[1], b[1]), mix(a[2], b[2])]
}

/// Three-stop gradient: `low` at 0, `mid` at 0.5, `high` at 1.
pub fn diverging(low: [u8; 3], mid: [u8; 3], high: [u8; 3], t: f64) -> [u8; 3] {
    if t < 0.5 {
        lerp_rgb(low, mid, t * 2.0)
    } else {
        lerp_rgb(mid, high, (t - 0.5) * 2.0)
    }
}

pub fn rgb(c: [u8; 3]) -> RGBColor {
    RGBColor(c[0], c[1], c[2])
}

/// Black or white, whichever reads better on `background`.
pub fn text_color_on(background: [u8; 3]) -> RGBColor {
    let luminance =
        0.299 * background[0] as f64 + 0.587 * background[1] as f64 + 0.114 * background[2] as f64;
    if luminance > 140.0 {
        RGBColor(0, 0, 0)
    } else {
        RGBColor(255, 255, 255)
    }
}

/// Create the parent directory of an output file if needed.
pub(crate) fn ensure_parent(path: &Path) -> RenderResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
