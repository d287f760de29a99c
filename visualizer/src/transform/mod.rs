//! Transformation module.
//!
//! This module turns loaded records into chart-ready data:
//! - Normalize: derived `overweight` flag, ordinal collapse
//! - Melt / Grouper: long-form rows and grouped counts for the cat plot
//! - Clean / Correlation: outlier filter and masked Pearson matrix for the heat map
//! - Pipeline: load → analyze → draw → verify

pub mod clean;
pub mod correlation;
pub mod grouper;
pub mod melt;
pub mod normalize;
pub mod pipeline;

pub use clean::clean;
pub use correlation::{upper_triangle_mask, CorrelationCell, CorrelationMatrix, MaskedMatrix};
pub use grouper::{count, CountRecord};
pub use melt::{melt, LongRow};
pub use normalize::normalize;
pub use pipeline::*;
