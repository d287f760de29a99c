//! High-level pipeline API: CSV → table → figures → PNG files → checks.
//!
//! This module combines all steps: parsing, normalization, aggregation,
//! correlation, drawing and verification.
//!
//! # Example
//!
//! ```rust,ignore
//! use medviz::{run, PipelineOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = run(&PipelineOptions::default())?;
//!     for file in &report.files {
//!         println!("wrote {}", file.display());
//!     }
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use std::path::{Path, PathBuf};

use super::clean::clean;
use super::correlation::{CorrelationMatrix, MaskedMatrix};
use super::grouper::{count, split_totals, CountRecord};
use super::melt::{melt, resolve_features, resolve_split};
use super::normalize::normalize;
use crate::config::PipelineOptions;
use crate::error::{PipelineResult, TransformError};
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::models::{Field, Table};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::render::{build_cat_plot, build_heat_map, draw_cat_plot, draw_heat_map, CatPlotFigure, HeatMapFigure};
use crate::verify::{verify_cat_plot, verify_heat_map, CatPlotExpectation, HeatMapExpectation, VerificationReport};

/// CSV file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub ignored_columns: Vec<String>,
}

/// Cat plot data: grouped counts and the figure built from them.
#[derive(Debug, Clone, Serialize)]
pub struct Categorical {
    pub split: Field,
    pub features: Vec<Field>,
    /// Number of long-form rows that were counted.
    pub long_rows: usize,
    pub counts: Vec<CountRecord>,
    pub figure: CatPlotFigure,
}

/// Heat map data: full matrix, masked matrix and the figure.
#[derive(Debug, Clone)]
pub struct Correlation {
    /// Records left after cleaning.
    pub rows: usize,
    pub matrix: CorrelationMatrix,
    pub masked: MaskedMatrix,
    pub figure: HeatMapFigure,
}

/// Which chart(s) a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    CatPlot,
    HeatMap,
}

impl Chart {
    pub const ALL: [Chart; 2] = [Chart::CatPlot, Chart::HeatMap];
}

/// Everything computed before drawing.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub csv_info: CsvInfo,
    pub table: Table,
    pub categorical: Option<Categorical>,
    pub correlation: Option<Correlation>,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub analysis: Analysis,
    /// Written images, in drawing order.
    pub files: Vec<PathBuf>,
    /// `None` when verification is disabled.
    pub verification: Option<VerificationReport>,
}

// =============================================================================
// Loading
// =============================================================================

/// Load and normalize the CSV named by `options.input`.
pub fn load(options: &PipelineOptions) -> PipelineResult<(CsvInfo, Table)> {
    log_info(format!("📖 Reading {}...", options.input.display()));
    let parse_result = parse_csv_file_auto(&options.input)?;
    load_parsed(parse_result, options)
}

/// Same as [`load`] but from raw bytes.
pub fn load_bytes(bytes: &[u8], options: &PipelineOptions) -> PipelineResult<(CsvInfo, Table)> {
    log_info("📖 Reading CSV bytes...");
    let parse_result = parse_bytes_auto(bytes)?;
    load_parsed(parse_result, options)
}

fn load_parsed(parse_result: ParseResult, options: &PipelineOptions) -> PipelineResult<(CsvInfo, Table)> {
    log_success(format!("Detected encoding: {}", parse_result.encoding));
    log_success(format!("Detected separator: '{}'", format_delimiter(parse_result.delimiter)));
    log_success(format!("Read {} rows", parse_result.records.len()));

    let csv_info = CsvInfo {
        encoding: parse_result.encoding.clone(),
        delimiter: parse_result.delimiter,
        headers: parse_result.headers.clone(),
        row_count: parse_result.records.len(),
        ignored_columns: parse_result.ignored_columns.clone(),
    };

    if parse_result.records.is_empty() {
        return Err(TransformError::EmptyInput.into());
    }

    log_info("⚖️  Deriving overweight flag...");
    let table = normalize(&parse_result.records, &options.bmi, options.normalize_ordinals)?;
    log_success(format!(
        "{:.1}% of subjects overweight (BMI > {})",
        table.overweight_share() * 100.0,
        options.bmi.cutoff
    ));

    Ok((csv_info, table))
}

/// Format delimiter for display
fn format_delimiter(d: char) -> &'static str {
    match d {
        ';' => ";",
        ',' => ",",
        '\t' => "TAB",
        '|' => "|",
        _ => "?",
    }
}

// =============================================================================
// Analysis
// =============================================================================

/// Melt, count and lay out the cat plot.
pub fn aggregate(table: &Table, options: &PipelineOptions) -> PipelineResult<Categorical> {
    log_info("📊 Counting categorical features...");
    let split = resolve_split(&options.split)?;
    let features = resolve_features(&options.features)?;

    let rows = melt(table, split, &features);
    let counts = count(&rows, &features);
    log_success(format!("{} long-form rows, {} groups", rows.len(), counts.len()));
    for (value, total) in split_totals(&counts) {
        log_info_indent(format!("{} = {}: {} rows", split, value, total), 1);
    }

    let figure = build_cat_plot(&counts, split, &features, &options.render.cat_plot);

    Ok(Categorical {
        split,
        features,
        long_rows: rows.len(),
        counts,
        figure,
    })
}

/// Clean (optionally), correlate, mask and lay out the heat map.
pub fn correlate(table: &Table, options: &PipelineOptions) -> PipelineResult<Correlation> {
    log_info("🔗 Correlating numeric fields...");
    let cleaned;
    let source = if options.clean_heat_map {
        cleaned = clean(table);
        let dropped = table.len() - cleaned.len();
        if dropped > 0 {
            log_info_indent(format!("Dropped {} outlier rows", dropped), 1);
        }
        &cleaned
    } else {
        table
    };

    let matrix = CorrelationMatrix::from_table(source, &Field::NUMERIC)?;
    let masked = matrix.masked();
    let undefined = masked.lower_triangle().iter().filter(|c| c.value.is_nan()).count();
    if undefined > 0 {
        log_warning(format!("{} coefficients undefined (constant column)", undefined));
    }
    log_success(format!("{}×{} matrix, {} cells shown", matrix.len(), matrix.len(), masked.retained_count()));

    let figure = build_heat_map(&masked, &options.render.heat_map);

    Ok(Correlation {
        rows: source.len(),
        matrix,
        masked,
        figure,
    })
}

/// Load the input and compute the data behind the requested charts.
pub fn analyze(options: &PipelineOptions, charts: &[Chart]) -> PipelineResult<Analysis> {
    let (csv_info, table) = load(options)?;
    analyze_table(csv_info, table, options, charts)
}

/// Same as [`analyze`] but from raw CSV bytes.
pub fn analyze_bytes(bytes: &[u8], options: &PipelineOptions, charts: &[Chart]) -> PipelineResult<Analysis> {
    let (csv_info, table) = load_bytes(bytes, options)?;
    analyze_table(csv_info, table, options, charts)
}

fn analyze_table(
    csv_info: CsvInfo,
    table: Table,
    options: &PipelineOptions,
    charts: &[Chart],
) -> PipelineResult<Analysis> {
    let categorical = if charts.contains(&Chart::CatPlot) {
        Some(aggregate(&table, options)?)
    } else {
        None
    };
    let correlation = if charts.contains(&Chart::HeatMap) {
        Some(correlate(&table, options)?)
    } else {
        None
    };

    Ok(Analysis {
        csv_info,
        table,
        categorical,
        correlation,
    })
}

// =============================================================================
// Drawing and verification
// =============================================================================

/// Checks for whatever the analysis holds.
pub fn verify(analysis: &Analysis, options: &PipelineOptions) -> VerificationReport {
    let mut report = VerificationReport::default();
    if let Some(cat) = &analysis.categorical {
        let expected = CatPlotExpectation::from_counts(&cat.counts, &cat.features, options);
        report.extend(verify_cat_plot(&cat.figure, &expected));
    }
    if let Some(corr) = &analysis.correlation {
        let expected = HeatMapExpectation::from_options(options);
        report.extend(verify_heat_map(&corr.figure, &expected));
    }
    report
}

/// Draw an already computed analysis to `options.out_dir`.
pub fn render(analysis: &Analysis, options: &PipelineOptions) -> PipelineResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    if let Some(cat) = &analysis.categorical {
        let path = options.cat_plot_path();
        draw_cat_plot(&cat.figure, &options.render.cat_plot, &path)?;
        log_success(format!("Categorical plot saved as '{}'.", display_name(&path)));
        files.push(path);
    }

    if let Some(corr) = &analysis.correlation {
        let path = options.heat_map_path();
        draw_heat_map(&corr.figure, &options.render.heat_map, &path)?;
        log_success(format!("Heat map saved as '{}'.", display_name(&path)));
        files.push(path);
    }

    Ok(files)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the requested charts end to end.
///
/// Any failure aborts the run; charts drawn before the failure stay on disk.
pub fn run_charts(options: &PipelineOptions, charts: &[Chart]) -> PipelineResult<RunReport> {
    let analysis = analyze(options, charts)?;
    let files = render(&analysis, options)?;

    let verification = if options.verify {
        log_info("✔️  Verifying figures...");
        let report = verify(&analysis, options);
        report.print();
        Some(report)
    } else {
        None
    };

    Ok(RunReport {
        analysis,
        files,
        verification,
    })
}

/// Full pipeline: both charts.
pub fn run(options: &PipelineOptions) -> PipelineResult<RunReport> {
    run_charts(options, &Chart::ALL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::logs::{drain, LOG_BROADCASTER};

    const HEADER: &str = "id,age,sex,height,weight,ap_hi,ap_lo,cholesterol,gluc,smoke,alco,active,cardio";

    fn sample_csv(n: usize) -> String {
        let mut out = HEADER.to_string();
        for i in 0..n {
            out.push_str(&format!(
                "\n{},{},{},{},{:.1},{},{},{},{},{},{},{},{}",
                i,
                14000 + (i * 37) % 9000,
                1 + i % 2,
                150 + (i * 7) % 40,
                50.0 + ((i * 11) % 50) as f64,
                110 + (i * 3) % 40,
                70 + (i * 5) % 20,
                1 + i % 3,
                1 + (i / 2) % 3,
                (i % 5 == 0) as u8,
                (i % 7 == 0) as u8,
                (i % 3 != 0) as u8,
                (i / 3) % 2,
            ));
        }
        out
    }

    #[test]
    fn test_analyze_both_charts() {
        let csv = sample_csv(60);
        let analysis = analyze_bytes(csv.as_bytes(), &PipelineOptions::default(), &Chart::ALL).unwrap();

        assert_eq!(analysis.csv_info.row_count, 60);
        assert_eq!(analysis.csv_info.delimiter, ',');

        let cat = analysis.categorical.as_ref().unwrap();
        assert_eq!(cat.long_rows, 60 * 6);
        assert_eq!(cat.figure.axes_count(), 2);

        let corr = analysis.correlation.as_ref().unwrap();
        assert!(corr.rows <= 60);
        assert_eq!(corr.masked.retained_count(), 14 * 13 / 2);
        assert_eq!(corr.figure.cells.len(), 14 * 13 / 2);
    }

    #[test]
    fn test_analyze_single_chart() {
        let csv = sample_csv(20);
        let analysis = analyze_bytes(csv.as_bytes(), &PipelineOptions::default(), &[Chart::CatPlot]).unwrap();
        assert!(analysis.categorical.is_some());
        assert!(analysis.correlation.is_none());
    }

    #[test]
    fn test_verification_passes_on_built_figures() {
        let csv = sample_csv(40);
        let options = PipelineOptions::default();
        let analysis = analyze_bytes(csv.as_bytes(), &options, &Chart::ALL).unwrap();

        let report = verify(&analysis, &options);
        assert!(report.is_success(), "{}", report.summary());
        assert!(report.passed() > 0);
    }

    #[test]
    fn test_padded_feature_names_still_verify() {
        let csv = sample_csv(30);
        let mut options = PipelineOptions::default();
        options.features = vec![" smoke".to_string(), "alco ".to_string()];

        let analysis = analyze_bytes(csv.as_bytes(), &options, &[Chart::CatPlot]).unwrap();
        assert_eq!(analysis.categorical.as_ref().unwrap().figure.features, vec!["smoke", "alco"]);

        let report = verify(&analysis, &options);
        assert!(report.is_success(), "{:?}", report.failures().collect::<Vec<_>>());
    }

    #[test]
    fn test_cleaning_can_be_disabled() {
        let csv = sample_csv(80);
        let mut options = PipelineOptions::default();
        options.clean_heat_map = false;
        let analysis = analyze_bytes(csv.as_bytes(), &options, &[Chart::HeatMap]).unwrap();
        assert_eq!(analysis.correlation.unwrap().rows, 80);
    }

    #[test]
    fn test_unknown_feature() {
        let csv = sample_csv(5);
        let mut options = PipelineOptions::default();
        options.features.push("bogus".to_string());

        let err = analyze_bytes(csv.as_bytes(), &options, &Chart::ALL).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(TransformError::MissingColumn(ref c)) if c == "bogus"));
    }

    #[test]
    fn test_non_binary_split() {
        let csv = sample_csv(5);
        let mut options = PipelineOptions::default();
        options.split = "cholesterol".to_string();

        let err = analyze_bytes(csv.as_bytes(), &options, &[Chart::CatPlot]).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(TransformError::NotBinary(_))));
    }

    #[test]
    fn test_header_only_is_empty_input() {
        let err = load_bytes(HEADER.as_bytes(), &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Transform(TransformError::EmptyInput)));
    }

    #[test]
    fn test_load_logs_progress() {
        let mut rx = LOG_BROADCASTER.subscribe();
        let csv = sample_csv(7);
        load_bytes(csv.as_bytes(), &PipelineOptions::default()).unwrap();

        let messages: Vec<String> = drain(&mut rx).into_iter().map(|e| e.message).collect();
        assert!(messages.iter().any(|m| m == "Read 7 rows"));
    }

    #[test]
    fn test_format_delimiter() {
        assert_eq!(format_delimiter(';'), ";");
        assert_eq!(format_delimiter('\t'), "TAB");
        assert_eq!(format_delimiter('#'), "?");
    }
}
