//! tubestat CLI - Command-line interface for tubestat
//!
//! Commands:
//! - analyze: Extract the YouTube partition and print the five chart views
//! - extract: Partition the export and persist the YouTube partition only
//! - parse-time: Run the timestamp normalizer on a single string

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::level_filters::LevelFilter;

use tubestat::logging::enable_logging;
use tubestat::types::AnalysisTable;
use tubestat::views::{all_views, render_text, ChartView};
use tubestat::{config, loader, normalize_timestamp, PipelineConfig, TUBESTAT_VERSION};

/// tubestat - Watch-history analysis
#[derive(Parser)]
#[command(name = "tubestat")]
#[command(version = TUBESTAT_VERSION)]
#[command(about = "Analyze a YouTube watch-history export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging on stderr
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the YouTube partition and print the five chart views
    Analyze {
        #[command(flatten)]
        paths: PathArgs,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Width of the longest bar in text output
        #[arg(long, default_value = "40")]
        width: usize,
    },

    /// Partition the export and persist the YouTube partition only
    Extract {
        #[command(flatten)]
        paths: PathArgs,
    },

    /// Run the timestamp normalizer on a single string
    ParseTime {
        /// Timestamp text
        text: String,
    },
}

#[derive(Args)]
struct PathArgs {
    /// Watch-history export
    #[arg(short, long, default_value = config::DEFAULT_INPUT)]
    input: PathBuf,

    /// Destination of the YouTube partition
    #[arg(long, default_value = config::DEFAULT_YOUTUBE_OUTPUT)]
    youtube_output: PathBuf,

    /// Destination of the YouTube Music partition
    #[arg(long, default_value = config::DEFAULT_MUSIC_OUTPUT)]
    music_output: PathBuf,

    /// Also write the YouTube Music partition
    #[arg(long)]
    persist_music: bool,
}

impl From<PathArgs> for PipelineConfig {
    fn from(args: PathArgs) -> Self {
        PipelineConfig {
            input: args.input,
            youtube_output: args.youtube_output,
            music_output: args.music_output,
            persist_music: args.persist_music,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Bar charts drawn with text
    Text,
    /// JSON object with the views and the run summary
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log.then_some(LevelFilter::DEBUG);
    enable_logging(level);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TubestatCliError> {
    match cli.command {
        Commands::Analyze {
            paths,
            format,
            width,
        } => cmd_analyze(paths.into(), format, width),
        Commands::Extract { paths } => cmd_extract(paths.into()),
        Commands::ParseTime { text } => cmd_parse_time(&text),
    }
}

fn cmd_analyze(
    config: PipelineConfig,
    format: OutputFormat,
    width: usize,
) -> Result<(), TubestatCliError> {
    let table = tubestat::run(&config)?;
    let views = all_views(&table);

    match format {
        OutputFormat::Text => print!("{}", format_text(&table, &views, width)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&summary(&config, &table, &views))?
        ),
        OutputFormat::JsonPretty => println!(
            "{}",
            serde_json::to_string_pretty(&summary(&config, &table, &views))?
        ),
    }

    Ok(())
}

fn cmd_extract(config: PipelineConfig) -> Result<(), TubestatCliError> {
    let partitions = loader::extract_and_save(&config)?;

    println!("Extraction and saving completed.");
    println!("YouTube:       {}", partitions.youtube.len());
    println!("YouTube Music: {}", partitions.youtube_music.len());
    println!("Excluded:      {}", partitions.excluded);
    println!("Written:       {}", config.youtube_output.display());
    if config.persist_music {
        println!("Written:       {}", config.music_output.display());
    }

    Ok(())
}

fn cmd_parse_time(text: &str) -> Result<(), TubestatCliError> {
    let time = normalize_timestamp(text)?;

    println!("Input:     {}", text);
    println!("Format:    {}", time.format.as_str());
    println!("Local:     {}", time.local.format("%Y-%m-%d %H:%M:%S%.f"));
    match time.utc_offset_seconds {
        Some(offset) => println!("Offset:    {}s", offset),
        None => println!("Offset:    none"),
    }
    println!("Weekday:   {}", time.weekday_index());

    Ok(())
}

// Helper functions

fn format_text(table: &AnalysisTable, views: &[ChartView], width: usize) -> String {
    let report = &table.report;
    let mut out = String::new();

    out.push_str("YouTube Data Visualization\n");
    out.push_str("==========================\n");
    out.push_str(&format!("Run:          {}\n", report.run_id));
    out.push_str(&format!("Rows:         {}\n", table.len()));
    if let Some(excluded) = report.excluded_records {
        out.push_str(&format!("Excluded:     {}\n", excluded));
    }
    out.push_str(&format!("Unparseable:  {}\n", report.unparseable_count()));

    for view in views {
        out.push('\n');
        out.push_str(&render_text(view, width));
    }

    out
}

fn summary<'a>(
    config: &'a PipelineConfig,
    table: &'a AnalysisTable,
    views: &'a [ChartView],
) -> RunSummary<'a> {
    RunSummary {
        version: TUBESTAT_VERSION,
        config,
        report: &table.report,
        views,
    }
}

// Error types

#[derive(Debug)]
enum TubestatCliError {
    Analysis(tubestat::AnalysisError),
    Timestamp(tubestat::TimestampParseError),
    Json(serde_json::Error),
}

impl From<tubestat::AnalysisError> for TubestatCliError {
    fn from(e: tubestat::AnalysisError) -> Self {
        TubestatCliError::Analysis(e)
    }
}

impl From<tubestat::TimestampParseError> for TubestatCliError {
    fn from(e: tubestat::TimestampParseError) -> Self {
        TubestatCliError::Timestamp(e)
    }
}

impl From<serde_json::Error> for TubestatCliError {
    fn from(e: serde_json::Error) -> Self {
        TubestatCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<TubestatCliError> for CliError {
    fn from(e: TubestatCliError) -> Self {
        match e {
            TubestatCliError::Analysis(e) => {
                let (code, hint) = match &e {
                    tubestat::AnalysisError::Read { .. } => {
                        ("READ_ERROR", "Check the input path and permissions")
                    }
                    tubestat::AnalysisError::Decode { .. } => {
                        ("DECODE_ERROR", "Input must be a UTF-8 JSON array of records")
                    }
                    tubestat::AnalysisError::Schema { .. } => (
                        "SCHEMA_ERROR",
                        "The YouTube partition is empty or lacks details, activityControls, products or header",
                    ),
                    tubestat::AnalysisError::Write { .. } => {
                        ("WRITE_ERROR", "Check the output path and permissions")
                    }
                    tubestat::AnalysisError::Encode(_) => ("ENCODE_ERROR", "Report this as a bug"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            TubestatCliError::Timestamp(e) => CliError {
                code: "TIMESTAMP_ERROR".to_string(),
                message: e.to_string(),
                hint: Some(
                    "Supported: ISO-8601/RFC 3339, YYYY/MM/DD HH:MM:SS, Mon DD, YYYY HH:MM:SS"
                        .to_string(),
                ),
            },
            TubestatCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    version: &'a str,
    config: &'a PipelineConfig,
    report: &'a tubestat::PipelineReport,
    views: &'a [ChartView],
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tubestat::process_records;

    #[test]
    fn test_summary_records_the_run_config() {
        let records = serde_json::from_value(serde_json::json!([
            {
                "header": "YouTube",
                "title": "Watched a",
                "time": "2023/05/14 10:15:30",
                "details": [],
                "products": [],
                "activityControls": []
            }
        ]))
        .unwrap();
        let table = process_records(records).unwrap();
        let views = all_views(&table);
        let config = PipelineConfig {
            input: PathBuf::from("takeout/watch-history.json"),
            persist_music: true,
            ..PipelineConfig::default()
        };

        let value = serde_json::to_value(summary(&config, &table, &views)).unwrap();

        assert_eq!(value["config"]["input"], "takeout/watch-history.json");
        assert_eq!(value["config"]["persist_music"], true);
        assert_eq!(value["version"], TUBESTAT_VERSION);
        assert_eq!(value["views"].as_array().map(Vec::len), Some(5));
    }
}
