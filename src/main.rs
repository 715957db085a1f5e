//! CLI entry point for the traffic survey analyzer.
//!
//! Provides subcommands for analyzing a day's survey CSV, creating an empty
//! survey file for a date, and showing previously saved results.

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use traffic_survey::{
    analyzers::analyzer::analyze_file,
    chart::render_hourly_chart,
    output::{
        SaveMode, load_previous, print_json, print_pretty, report_lines, save_report,
        write_report,
    },
    schema::{Dialect, FieldMapping},
    survey::{FileNaming, SurveyDate, create_survey_file, survey_path},
};

#[derive(Parser)]
#[command(name = "traffic_survey")]
#[command(about = "A tool to analyze daily traffic survey counts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a survey CSV and print the report
    Analyze {
        /// Survey CSV file; omit to select the file by --date
        #[arg(value_name = "FILE", required_unless_present = "date", conflicts_with = "date")]
        file: Option<PathBuf>,

        #[command(flatten)]
        location: SurveyLocation,

        #[command(flatten)]
        mapping: MappingArgs,

        /// Save the report to this text file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Append to the results file instead of overwriting it
        #[arg(long, default_value_t = false, requires = "save")]
        append: bool,

        /// Also draw the hourly junction histogram
        #[arg(long, default_value_t = false, conflicts_with = "json")]
        chart: bool,

        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Create an empty survey CSV (header only) for a date
    Init {
        #[command(flatten)]
        location: SurveyLocation,

        #[command(flatten)]
        mapping: MappingArgs,
    },
    /// Show results saved by a previous analysis
    Previous {
        /// Results file to read
        #[arg(short, long, default_value = "results.txt")]
        results: PathBuf,
    },
}

#[derive(Args)]
struct SurveyLocation {
    /// Survey date, YYYY-MM-DD or DD/MM/YYYY
    #[arg(short, long)]
    date: Option<String>,

    /// Directory holding survey files (defaults to $TRAFFIC_DATA_DIR or ".")
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// File naming convention used for dated survey files
    #[arg(long, value_enum, default_value_t = NamingArg::Iso)]
    naming: NamingArg,
}

#[derive(Args)]
struct MappingArgs {
    /// CSV header dialect
    #[arg(long, value_enum, default_value_t = DialectArg::Simple)]
    dialect: DialectArg,

    /// JSON field mapping file; overrides --dialect
    #[arg(short, long)]
    mapping: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Simple,
    Extended,
}

#[derive(Clone, Copy, ValueEnum)]
enum NamingArg {
    /// YYYY-MM-DD.csv
    Iso,
    /// traffic_dataDDMMYYYY.csv
    Compact,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Simple => Dialect::Simple,
            DialectArg::Extended => Dialect::Extended,
        }
    }
}

impl From<NamingArg> for FileNaming {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Iso => FileNaming::Iso,
            NamingArg::Compact => FileNaming::Compact,
        }
    }
}

impl MappingArgs {
    fn resolve(&self) -> Result<FieldMapping> {
        match &self.mapping {
            Some(path) => FieldMapping::load(path),
            None => Ok(FieldMapping::for_dialect(self.dialect.into())),
        }
    }
}

impl SurveyLocation {
    fn dated_path(&self) -> Result<Option<PathBuf>> {
        let Some(date) = &self.date else {
            return Ok(None);
        };
        let date = SurveyDate::parse(date)?;
        info!(date = %date, "Survey date selected");

        let data_dir = self.data_dir.clone().unwrap_or_else(|| {
            PathBuf::from(std::env::var("TRAFFIC_DATA_DIR").unwrap_or_else(|_| ".".to_string()))
        });
        Ok(Some(survey_path(&data_dir, date, self.naming.into())))
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            location,
            mapping,
            save,
            append,
            chart,
            json,
        } => {
            let path = match file {
                Some(file) => file,
                None => match location.dated_path()? {
                    Some(path) => path,
                    None => anyhow::bail!("either FILE or --date is required"),
                },
            };
            let mapping = mapping.resolve()?;

            let Some(analysis) = analyze_file(&path, &mapping)? else {
                error!(path = %path.display(), "Survey file not found, nothing to analyze");
                return Ok(());
            };

            if analysis.rejected_rows > 0 {
                warn!(
                    rejected_rows = analysis.rejected_rows,
                    "Some rows could not be read and were left out"
                );
            }

            let report = &analysis.report;
            let source = path.display().to_string();
            let lines = report_lines(report, &source);
            print_pretty(report);

            let mut out = io::stdout().lock();
            if json {
                print_json(&mut out, report)?;
            } else {
                write_report(&mut out, &lines)?;
            }
            if chart {
                writeln!(out)?;
                render_hourly_chart(&mut out, &report.counts, &source)?;
            }

            if let Some(save) = save {
                let mode = if append {
                    SaveMode::Append
                } else {
                    SaveMode::Overwrite
                };
                save_report(&save, &lines, mode)?;
            }
        }
        Commands::Init { location, mapping } => {
            let Some(path) = location.dated_path()? else {
                anyhow::bail!("--date is required to create a survey file");
            };
            create_survey_file(&path, &mapping.resolve()?)?;
            info!(path = %path.display(), "Ready for survey data");
        }
        Commands::Previous { results } => {
            let entries = load_previous(&results)?;
            if entries.is_empty() {
                info!(path = %results.display(), "No saved results");
            }

            let mut out = io::stdout().lock();
            for (key, value) in entries {
                writeln!(out, "{key}: {value}")?;
            }
        }
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
///
/// The returned guard flushes the file writer on drop and must live until exit.
fn init_tracing() -> WorkerGuard {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/traffic_survey.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("traffic_survey.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive(LevelFilter::INFO.into()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive(LevelFilter::DEBUG.into()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    file_guard
}
