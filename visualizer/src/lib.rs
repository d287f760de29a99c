//! # medviz - Medical examination data visualizer
//!
//! medviz loads a medical examination CSV, derives an `overweight` flag, and
//! draws two charts: a grouped bar chart of categorical features split by the
//! cardiovascular outcome, and a lower-triangle correlation heat map.
//!
//! ## Architecture
//!
//! ```text
//!                                  ┌─────────────┐     ┌─────────────┐
//!                             ┌───▶│ melt/count  │────▶│ catplot.png │
//! ┌─────────────┐     ┌───────┴─────┐└─────────────┘     └─────────────┘
//! │   CSV File  │────▶│  Normalize  │
//! │  (auto-enc) │     │ (overweight)│┌─────────────┐     ┌─────────────┐
//! └─────────────┘     └───────┬─────┘│ clean/corr  │────▶│ heatmap.png │
//!                             └───▶│   + mask    │     └─────────────┘
//!                                  └─────────────┘
//! ```
//!
//! Both charts are built as figure models first ([`render::figure`]), drawn
//! with `plotters`, then checked by [`verify`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use medviz::{run, PipelineOptions};
//!
//! fn main() {
//!     let report = run(&PipelineOptions::default()).unwrap();
//!     println!("{:?}", report.files);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Schema, records and the augmented table
//! - [`parser`] - CSV parsing with auto-detection
//! - [`transform`] - Normalization, aggregation, correlation and pipeline
//! - [`render`] - Figure models and PNG drawing
//! - [`verify`] - Structural checks on figures
//! - [`config`] - Pipeline options and render styling
//! - [`logs`] - Progress log broadcaster

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Parsing
pub mod parser;

// Transformation
pub mod transform;

// Drawing
pub mod render;

// Checks
pub mod verify;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigError, CsvError, PipelineError, RenderError, TransformError};

// =============================================================================
// Re-exports - Models and config
// =============================================================================

pub use config::{BmiRule, CatPlotStyle, ColorScale, HeatMapStyle, PipelineOptions, RenderConfig};
pub use models::{Field, FieldKind, Record, Subject, Table, SCHEMA};

// =============================================================================
// Re-exports - CSV Parsing
// =============================================================================

pub use parser::{
    decode_content,
    detect_delimiter,
    detect_encoding,
    parse_bytes_auto,
    parse_csv_file_auto,
    ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    clean,
    count,
    melt,
    normalize,
    upper_triangle_mask,
    CorrelationMatrix,
    CountRecord,
    LongRow,
    MaskedMatrix,
};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    aggregate,
    analyze,
    analyze_bytes,
    correlate,
    load,
    load_bytes,
    run,
    run_charts,
    Analysis,
    Categorical,
    Chart,
    Correlation,
    CsvInfo,
    RunReport,
};

// =============================================================================
// Re-exports - Render and verify
// =============================================================================

pub use render::{build_cat_plot, build_heat_map, draw_cat_plot, draw_heat_map, CatPlotFigure, HeatMapFigure};
pub use verify::{verify_cat_plot, verify_heat_map, Check, VerificationReport};
