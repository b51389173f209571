//! hostinv agent
//!
//! Collects the local host's inventory, saves it, and delivers it to the
//! collection endpoint when it changed since the last delivery.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use color_eyre::{Result, Section};
use eyre::WrapErr;
use hostinv_client::HttpTransport;
use hostinv_core::{AgentConfig, ChangePolicy, Pipeline, PipelineError, RunReport};
use hostinv_exec::LocalRunner;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod report;

#[derive(Parser)]
#[command(name = "hostinv", version)]
#[command(about = "Collect host inventory and deliver it to a collection endpoint", long_about = None)]
struct Cli {
    /// Config file (default: $HOSTINV_CONFIG, ./hostinv.toml, /etc/hostinv/hostinv.toml, then the user config dir)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Deliver even if the inventory is unchanged
    #[arg(long)]
    force: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let (config, source) = config::load(cli.config.as_deref())?;
    init_tracing(&config.agent.log_level, cli.log_format)?;
    match &source {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => warn!("no config file found, using defaults"),
    }

    config
        .validate()
        .wrap_err("invalid configuration")
        .suggestion("set the delivery identity in the config file or via HOSTINV_ENDPOINT, HOSTINV_TOKEN and HOSTINV_SERVER_ID")?;

    run(&cli, &config).await
}

async fn run(cli: &Cli, config: &AgentConfig) -> Result<ExitCode> {
    let transport = HttpTransport::new(&config.delivery.endpoint, config.delivery_timeout())?;
    let mut pipeline = Pipeline::new(Arc::new(LocalRunner::new()), Arc::new(transport), config);
    if cli.force {
        pipeline = pipeline.with_policy(ChangePolicy::AlwaysSend);
    }

    let outcome = pipeline.run().await;
    conclude(outcome, config, pipeline.store().artifact_path())
}

/// Print the run's result and pick the exit status
///
/// A failed delivery prints its checklist and exits non-zero without an error
/// report; every other pipeline error is returned to color-eyre.
fn conclude(
    outcome: std::result::Result<RunReport, PipelineError>,
    config: &AgentConfig,
    artifact: &Path,
) -> Result<ExitCode> {
    match outcome {
        Ok(report) => {
            println!("{}", report::render_summary(&report));
            Ok(ExitCode::SUCCESS)
        }
        Err(PipelineError::Delivery(e)) => {
            eprintln!("{}", report::render_delivery_failure(config, artifact, &e));
            Ok(ExitCode::FAILURE)
        }
        Err(e @ PipelineError::NotRoot { .. }) => {
            Err(e).suggestion("run as root, or set agent.require_root = false")
        }
        Err(e) => Err(e.into()),
    }
}

fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}
