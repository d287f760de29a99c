//! medviz CLI - Draw medical examination charts from a CSV file
//!
//! # Main Commands
//!
//! ```bash
//! medviz run                          # Both charts + verification
//! medviz catplot --input data.csv     # Grouped bar chart only
//! medviz heatmap --out-dir charts     # Correlation heat map only
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! medviz inspect                      # Encoding, delimiter, columns, rows
//! medviz counts                       # Aggregated counts as JSON
//! medviz corr                         # Lower-triangle correlations as JSON
//! medviz default-config               # Default configuration as JSON
//! ```

use clap::{Parser, Subcommand};
use medviz::logs::log_error;
use medviz::{aggregate, correlate, load, run_charts, Chart, PipelineOptions, RunReport};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "medviz")]
#[command(about = "Draw categorical and correlation charts from medical examination data", long_about = None)]
struct Cli {
    /// Input CSV file (default: medical_examination.csv)
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// Directory the images are written to
    #[arg(short = 'd', long, global = true)]
    out_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: CSV → cat plot + heat map → checks
    Run {
        /// Skip figure verification
        #[arg(long)]
        no_verify: bool,
    },

    /// Draw only the categorical plot
    Catplot {
        /// Skip figure verification
        #[arg(long)]
        no_verify: bool,
    },

    /// Draw only the correlation heat map
    Heatmap {
        /// Skip figure verification
        #[arg(long)]
        no_verify: bool,
    },

    /// Load the CSV and print what was detected
    Inspect,

    /// Print grouped counts as JSON
    Counts {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the masked correlation matrix as JSON
    Corr {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the default configuration
    DefaultConfig,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = build_options(&cli).and_then(|options| match cli.command {
        Commands::Run { no_verify } => cmd_draw(options, &Chart::ALL, no_verify),
        Commands::Catplot { no_verify } => cmd_draw(options, &[Chart::CatPlot], no_verify),
        Commands::Heatmap { no_verify } => cmd_draw(options, &[Chart::HeatMap], no_verify),
        Commands::Inspect => cmd_inspect(&options),
        Commands::Counts { ref output } => cmd_counts(&options, output.as_deref()),
        Commands::Corr { ref output } => cmd_corr(&options, output.as_deref()),
        Commands::DefaultConfig => cmd_default_config(),
    });

    if let Err(e) = result {
        log_error(format!("Error: {}", e));
        std::process::exit(1);
    }
}

/// Config file, then environment, then flags.
fn build_options(cli: &Cli) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => PipelineOptions::from_file(path)?,
        None => PipelineOptions::default(),
    };
    options.apply_env();

    if let Some(input) = &cli.input {
        options.input = input.clone();
    }
    if let Some(dir) = &cli.out_dir {
        options.out_dir = dir.clone();
    }
    Ok(options)
}

fn cmd_draw(
    mut options: PipelineOptions,
    charts: &[Chart],
    no_verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if no_verify {
        options.verify = false;
    }

    let RunReport { verification, files, .. } = run_charts(&options, charts)?;

    eprintln!("\n✨ Done! {} image(s) written", files.len());

    match verification {
        Some(report) if !report.is_success() => {
            Err(format!("{} of {} checks failed", report.failed(), report.checks.len()).into())
        }
        _ => Ok(()),
    }
}

fn cmd_inspect(options: &PipelineOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (info, table) = load(options)?;

    println!("File:       {}", options.input.display());
    println!("Encoding:   {}", info.encoding);
    println!("Delimiter:  '{}'", format_delimiter(info.delimiter));
    println!("Rows:       {}", info.row_count);
    println!("Columns:    {}", info.headers.join(", "));
    if !info.ignored_columns.is_empty() {
        println!("Ignored:    {}", info.ignored_columns.join(", "));
    }
    println!("Overweight: {:.1}%", table.overweight_share() * 100.0);
    Ok(())
}

fn cmd_counts(options: &PipelineOptions, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (_, table) = load(options)?;
    let categorical = aggregate(&table, options)?;

    let json = serde_json::to_string_pretty(&categorical.counts)?;
    write_output(&json, output)
}

fn cmd_corr(options: &PipelineOptions, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let (_, table) = load(options)?;
    let correlation = correlate(&table, options)?;

    let json = serde_json::to_string_pretty(&correlation.masked.lower_triangle())?;
    write_output(&json, output)
}

fn cmd_default_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", PipelineOptions::default().to_json()?);
    Ok(())
}

fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
