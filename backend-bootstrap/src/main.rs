use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use backend_bootstrap::{run_job, run_standalone, AppContext, JobOptions, JobReportFormat};
use backend_domain::ports::ReportUploader;
use backend_domain::parse_report_stats;
use backend_infrastructure::{read_report, AppConfig, GcsReportUploader};

#[derive(Parser, Debug)]
#[command(name = "dast-backend")]
#[command(about = "Automated Cognitive DAST service", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Run a single scan to completion and write its report
    Scan {
        /// Target URL
        #[arg(long)]
        url: String,
        /// Scan type (WEB, API, BASELINE)
        #[arg(long = "type", default_value = "WEB")]
        scan_type: String,
        /// Checks to enable, e.g. "SQL Injection" XSS
        #[arg(long, num_args = 0..)]
        checks: Vec<String>,
        /// YAML file with engine rule overrides
        #[arg(long)]
        rules_file: Option<PathBuf>,
        /// Natural-language scan request
        #[arg(long)]
        ai_prompt: Option<String>,
        /// Bucket the report is uploaded to
        #[arg(long)]
        bucket: Option<String>,
        /// Report format: json or html (engine report), sarif or ocsf (converted)
        #[arg(long, default_value = "json")]
        format: String,
        /// Report path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Summarize a saved report
    Stats {
        file: PathBuf,
        #[arg(long, default_value = "json")]
        format: String,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(Command::Stats { file, format, json }) = &cli.command {
        init_logging(None);
        return print_stats(file, format, *json).await;
    }

    let config = AppConfig::load(cli.config.as_deref()).await?;
    init_logging(config.log_dir.as_deref());

    let context = AppContext::new(config)?;
    match cli.command {
        None | Some(Command::Serve) => {
            run_standalone(context).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::Scan {
            url,
            scan_type,
            checks,
            rules_file,
            ai_prompt,
            bucket,
            format,
            output,
        }) => {
            let Some(format) = JobReportFormat::parse(&format) else {
                bail!("unsupported report format '{}'", format);
            };
            let bucket = bucket.or_else(|| context.config.gcs_bucket.clone());
            let uploader = bucket.and_then(|bucket| {
                match GcsReportUploader::from_config(&context.state.config, &bucket) {
                    Ok(uploader) => Some(Arc::new(uploader) as Arc<dyn ReportUploader>),
                    Err(err) => {
                        warn!("report upload disabled: {:#}", err);
                        None
                    }
                }
            });
            let options = JobOptions {
                url,
                scan_type: Some(scan_type),
                checks,
                rules_file,
                ai_prompt,
                format,
                output,
            };

            let outcome = run_job(&context.state, options, uploader).await?;
            if let Some(location) = &outcome.uploaded_to {
                info!("report uploaded to {}", location);
            }
            if outcome.succeeded() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::FAILURE)
            }
        }
        Some(Command::Stats { .. }) => Ok(ExitCode::SUCCESS),
    }
}

async fn print_stats(file: &Path, format: &str, json: bool) -> Result<ExitCode> {
    let document = read_report(file).await?;
    let stats = parse_report_stats(&document, format);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(ExitCode::SUCCESS)
}

fn init_logging(log_dir: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = log_dir.map(|dir| {
        let appender = RollingFileAppender::new(Rotation::DAILY, dir, "dast-backend.log");
        fmt::layer().with_writer(appender).with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();
}
