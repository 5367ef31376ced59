use clap::{ArgAction, Parser, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use faultlens::analysis::{AnalysisEngine, RaisedError};
use faultlens::config::ExceptionProperties;
use faultlens::logging::{init_logging, LoggingConfig};
use faultlens::render::ReportRenderer;
use faultlens::response::ResponseBuilder;
use faultlens::startup::StartupFailureReporter;

/// Output format for `classify`
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ClassifyFormat {
    /// The classification result
    #[default]
    Json,
    /// The error payload a caller would receive
    Response,
}

#[derive(Parser, Debug)]
#[command(name = "faultlens")]
#[command(version)]
#[command(about = "Classify raised errors and explain startup failures")]
struct Cli {
    /// Properties file (TOML). FAULTLENS__* environment variables override it
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Disable colors (also respects NO_COLOR environment variable)
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Classify a raised error read as JSON
    Classify {
        /// Input file (defaults to stdin)
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Output format (json, response)
        #[arg(long, short = 'f', default_value = "json", value_enum)]
        format: ClassifyFormat,

        /// Request path recorded in the response payload
        #[arg(long, default_value = "/")]
        instance: String,

        /// Active deployment profile (repeatable)
        #[arg(long = "profile", value_name = "NAME")]
        profiles: Vec<String>,
    },
    /// Print the startup failure report for a raised error read as JSON
    Report {
        /// Input file (defaults to stdin)
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// List registered analyzers in dispatch order
    Analyzers,
}

fn load_properties(path: Option<&Path>) -> Result<ExceptionProperties, Box<dyn std::error::Error>> {
    let properties = match path {
        Some(path) => ExceptionProperties::load(path),
        None => ExceptionProperties::from_env(),
    }
    .map_err(|e| format!("Failed to load properties: {}", e))?;
    Ok(properties)
}

fn read_raised(input: Option<&Path>) -> Result<RaisedError, Box<dyn std::error::Error>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let raised = serde_json::from_str(&text).map_err(|e| format!("Invalid error JSON: {}", e))?;
    Ok(raised)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Ignore the error: a subscriber may already be installed.
    init_logging(LoggingConfig::from_verbosity(cli.verbose)).ok();

    let use_color = !cli.no_color && std::env::var("NO_COLOR").is_err();
    let renderer = ReportRenderer::new().with_color(use_color);
    let properties = load_properties(cli.config.as_deref())?;

    match cli.command {
        Commands::Classify {
            input,
            format,
            instance,
            profiles,
        } => {
            let raised = read_raised(input.as_deref())?;
            let engine = AnalysisEngine::from_properties(&properties);
            let result = engine.classify(&raised);

            let output = match format {
                ClassifyFormat::Json => serde_json::to_string_pretty(&result)?,
                ClassifyFormat::Response => {
                    let mut active = properties.response.active_profiles.clone();
                    active.extend(profiles);
                    let response = ResponseBuilder::new(active)
                        .from_classification(&result, &instance, &raised);
                    serde_json::to_string_pretty(&response)?
                }
            };
            println!("{}", output);
        }
        Commands::Report { input } => {
            let raised = read_raised(input.as_deref())?;
            let Some(reporter) = StartupFailureReporter::from_properties(&properties) else {
                eprintln!("Startup failure reporting is disabled");
                return Ok(ExitCode::from(2));
            };
            print!("{}", renderer.render_report(&reporter.report(&raised)));
        }
        Commands::Analyzers => {
            let engine = AnalysisEngine::from_properties(&properties);
            let startup = StartupFailureReporter::from_engine(&engine);
            let mut request_order = engine.strategies().to_vec();
            request_order.sort_by_key(|strategy| strategy.priority());
            print!(
                "{}",
                renderer.render_strategies("Request-time order (lowest first):", &request_order)
            );
            println!();
            print!(
                "{}",
                renderer.render_strategies(
                    "Startup order (highest first):",
                    startup.strategies()
                )
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
